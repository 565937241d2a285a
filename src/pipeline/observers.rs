//! Observer implementations for run pipelines
//!
//! Observers allow composable data collection during a run without coupling
//! the tick loop to specific output formats.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    Result,
    agent::FoodEvent,
    episode_log::PeriodEvent,
    identifiers::AgentId,
    ports::Observer,
    simulation::{Simulation, TickReport},
};

/// Progress bar observer - Shows run progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    food_found: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            food_found: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, total_ticks: u64, _sim: &Simulation) -> Result<()> {
        let pb = ProgressBar::new(total_ticks);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ticks ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_food_found(&mut self, _event: &FoodEvent) -> Result<()> {
        self.food_found += 1;
        Ok(())
    }

    fn on_tick_end(&mut self, report: &TickReport) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(report.tick);
            pb.set_message(format!(
                "food: {}, live: {}",
                self.food_found, report.live_agents
            ));
        }
        Ok(())
    }

    fn on_run_end(&mut self, _sim: &Simulation) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("food: {}", self.food_found));
        }
        Ok(())
    }
}

/// Metrics observer - Tracks food and exhaustion over a run
#[derive(Default)]
pub struct MetricsObserver {
    ticks: u64,
    agent_steps: usize,
    food_found: usize,
    exhausted: usize,
    failures: usize,
    first_food_tick: Option<u64>,
    current_tick: u64,
    food_by_agent: BTreeMap<AgentId, usize>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Food found per agent step
    pub fn food_rate(&self) -> f64 {
        if self.agent_steps == 0 {
            0.0
        } else {
            self.food_found as f64 / self.agent_steps as f64
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            ticks: self.ticks,
            agent_steps: self.agent_steps,
            food_found: self.food_found,
            food_rate: self.food_rate(),
            exhausted: self.exhausted,
            failures: self.failures,
            first_food_tick: self.first_food_tick,
            food_by_agent: self
                .food_by_agent
                .iter()
                .map(|(agent, count)| (agent.to_string(), *count))
                .collect(),
        }
    }
}

/// Summary of run metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub ticks: u64,
    pub agent_steps: usize,
    pub food_found: usize,
    pub food_rate: f64,
    pub exhausted: usize,
    pub failures: usize,
    pub first_food_tick: Option<u64>,
    pub food_by_agent: BTreeMap<String, usize>,
}

impl Observer for MetricsObserver {
    fn on_tick_start(&mut self, tick: u64) -> Result<()> {
        self.current_tick = tick;
        Ok(())
    }

    fn on_food_found(&mut self, event: &FoodEvent) -> Result<()> {
        self.food_found += 1;
        *self.food_by_agent.entry(event.agent).or_default() += 1;
        if self.first_food_tick.is_none() {
            self.first_food_tick = Some(self.current_tick);
        }
        Ok(())
    }

    fn on_agent_exhausted(&mut self, _agent: AgentId) -> Result<()> {
        self.exhausted += 1;
        Ok(())
    }

    fn on_tick_end(&mut self, report: &TickReport) -> Result<()> {
        self.ticks += 1;
        self.agent_steps += report.moved;
        self.failures += report.failures.len();
        Ok(())
    }
}

/// JSONL observer - Writes one tick report per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_tick_end(&mut self, report: &TickReport) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_run_end(&mut self, _sim: &Simulation) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Trace observer - Forwards closed log periods to `tracing`
#[derive(Debug, Default)]
pub struct TraceObserver;

impl Observer for TraceObserver {
    fn on_period_advanced(&mut self, event: &PeriodEvent) -> Result<()> {
        trace!(agent = %event.agent, period = event.period, "{}", event.text);
        Ok(())
    }

    fn on_food_found(&mut self, event: &FoodEvent) -> Result<()> {
        trace!(
            agent = %event.agent,
            food = %event.food,
            position = %event.position,
            fate = ?event.fate,
            "food found"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader};

    use tempfile::TempDir;

    use super::*;
    use crate::{
        app::SimulationConfig, learning::StrategyKind, pipeline::RunPipeline, types::Position,
    };

    fn food_scenario() -> Simulation {
        let config = SimulationConfig::default()
            .with_grid(10, 10)
            .with_food(0, 10)
            .with_agents(0)
            .with_seed(7);
        let mut sim = Simulation::new(config).unwrap();
        sim.environment_mut()
            .place_food(Position::new(5, 5), 10)
            .unwrap();
        sim.spawn_agent_at(StrategyKind::OdorFollowing, Position::new(5, 6))
            .unwrap();
        sim
    }

    #[test]
    fn test_metrics_observer_counts_food() {
        let mut sim = food_scenario();
        let mut metrics = MetricsObserver::new();

        metrics.on_tick_start(1).unwrap();
        let report = sim.tick();
        for food in &report.food {
            metrics.on_food_found(food).unwrap();
        }
        metrics.on_tick_end(&report).unwrap();

        let summary = metrics.summary();
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.food_found, 1);
        assert_eq!(summary.first_food_tick, Some(1));
        assert_eq!(summary.food_by_agent["001"], 1);
        assert!((summary.food_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_jsonl_observer_writes_one_line_per_tick() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("ticks.jsonl");
        let mut sim = food_scenario();

        let observer = JsonlObserver::new(&path).unwrap();
        RunPipeline::new()
            .with_observer(Box::new(observer))
            .with_observer(Box::new(TraceObserver))
            .run(&mut sim, 4)
            .unwrap();

        let lines: Vec<String> = BufReader::new(File::open(&path).unwrap())
            .lines()
            .map(|line| line.unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        let first: TickReport = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first.tick, 1);
        assert_eq!(first.food.len(), 1);
    }
}
