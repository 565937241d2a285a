//! Run pipeline driving a simulation for a number of ticks

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Result, analysis::PopulationStats, ports::Observer, simulation::Simulation};

/// Result of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Seed of the simulation's random number generator
    pub seed: u64,
    /// Ticks actually executed
    pub ticks: u64,
    /// Every agent became inert before the requested tick count
    pub stopped_early: bool,
    /// Agent steps that failed and were skipped
    pub failures: usize,
    pub stats: PopulationStats,
}

impl RunResult {
    pub fn new(sim: &Simulation, ticks: u64, stopped_early: bool, failures: usize) -> Self {
        Self {
            seed: sim.seed(),
            ticks,
            stopped_early,
            failures,
            stats: PopulationStats::collect(sim.population()),
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Drives [`Simulation::tick`] and fans events out to observers
#[derive(Default)]
pub struct RunPipeline {
    observers: Vec<Box<dyn Observer>>,
}

impl RunPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run up to `ticks` ticks, stopping early once every agent is inert.
    ///
    /// # Errors
    ///
    /// Returns the first observer error; the simulation itself never fails
    /// a tick.
    pub fn run(&mut self, sim: &mut Simulation, ticks: u64) -> Result<RunResult> {
        for observer in &mut self.observers {
            observer.on_run_start(ticks, sim)?;
        }

        let mut executed = 0;
        let mut failures = 0;
        let mut stopped_early = false;

        for _ in 0..ticks {
            if sim.all_inert() {
                stopped_early = true;
                info!(tick = sim.tick_count(), "all agents inert, stopping");
                break;
            }

            let tick = sim.tick_count() + 1;
            for observer in &mut self.observers {
                observer.on_tick_start(tick)?;
            }

            let report = sim.tick();
            executed += 1;
            failures += report.failures.len();

            for observer in &mut self.observers {
                for period in &report.periods {
                    observer.on_period_advanced(period)?;
                }
                for food in &report.food {
                    observer.on_food_found(food)?;
                }
                for &agent in &report.exhausted {
                    observer.on_agent_exhausted(agent)?;
                }
                observer.on_tick_end(&report)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_run_end(sim)?;
        }

        Ok(RunResult::new(sim, executed, stopped_early, failures))
    }
}
