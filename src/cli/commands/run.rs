//! Run command - Drive a foraging population for a number of ticks

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    app::{App, SimulationConfig},
    cli::output::{print_kv, print_metrics, print_population, print_section},
    identifiers::AgentId,
    learning::StrategyKind,
    pipeline::{JsonlObserver, MetricsObserver, ProgressObserver, RunPipeline, TraceObserver},
    simulation::Simulation,
};

#[derive(Parser, Debug)]
#[command(about = "Run a foraging simulation")]
pub struct RunArgs {
    /// Simulation config file (JSON); flags below override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Movement strategy: random, odor, brain, or a learning method name
    #[arg(long, short = 's')]
    pub strategy: Option<String>,

    /// Learning method when the strategy is "brain"
    #[arg(long, short = 'm')]
    pub method: Option<String>,

    /// Number of agents
    #[arg(long, short = 'a')]
    pub agents: Option<usize>,

    /// Number of ticks to run
    #[arg(long, short = 't', default_value_t = 1000)]
    pub ticks: u64,

    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub height: Option<usize>,

    /// Food items kept on the grid
    #[arg(long)]
    pub food: Option<usize>,

    /// Calories per food item
    #[arg(long)]
    pub calories: Option<u32>,

    /// Starting energy of each agent
    #[arg(long)]
    pub energy: Option<u32>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory holding the learned value files
    #[arg(long)]
    pub values_dir: Option<PathBuf>,

    /// Start learners from default values instead of the value files
    #[arg(long, default_value_t = false)]
    pub fresh: bool,

    /// Write the best learner of each method back to its value file
    #[arg(long, default_value_t = false)]
    pub save_values: bool,

    /// Write one tick report per line to this JSONL file
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Write the run result as JSON to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Forward agent log periods to the trace log
    #[arg(long, default_value_t = false)]
    pub trace: bool,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

fn resolve_strategy(strategy: &str, method: Option<&str>) -> Result<StrategyKind> {
    let kind = match method {
        Some(method) => StrategyKind::from_names(strategy, Some(method))?,
        None => strategy.parse()?,
    };
    Ok(kind)
}

pub(crate) fn build_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(strategy) = args.strategy.as_deref() {
        config.strategy = resolve_strategy(strategy, args.method.as_deref())?;
    } else if let Some(method) = args.method.as_deref() {
        config.strategy = resolve_strategy("brain", Some(method))?;
    }
    if let Some(agents) = args.agents {
        config.initial_agents = agents;
    }
    if let Some(width) = args.width {
        config.grid_width = width;
    }
    if let Some(height) = args.height {
        config.grid_height = height;
    }
    if let Some(food) = args.food {
        config.desired_food = food;
    }
    if let Some(calories) = args.calories {
        config.food_calories = calories;
    }
    if let Some(energy) = args.energy {
        config.initial_energy = energy;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(dir) = &args.values_dir {
        config.persistence.directory = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

/// The agent of each learning method that found the most food.
fn best_learners(sim: &Simulation) -> Vec<AgentId> {
    let mut best: BTreeMap<String, (u32, AgentId)> = BTreeMap::new();
    for agent in sim.population().iter().filter(|agent| agent.kind().is_learning()) {
        let entry = best
            .entry(agent.kind().label().to_string())
            .or_insert((agent.food_found(), agent.id()));
        if agent.food_found() > entry.0 {
            *entry = (agent.food_found(), agent.id());
        }
    }
    best.into_values().map(|(_, id)| id).collect()
}

pub fn execute(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let app = App::new();

    let mut sim = if args.fresh {
        Simulation::new(config)?
    } else {
        app.create_simulation(config)?
    };

    print_section("Foraging run");
    print_kv("Seed", &sim.seed().to_string());
    print_kv(
        "Grid",
        &format!("{} x {}", sim.environment().width(), sim.environment().height()),
    );
    print_kv("Strategy", sim.config().strategy.label());
    print_kv("Agents", &sim.population().len().to_string());
    print_kv("Ticks", &args.ticks.to_string());

    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut pipeline = RunPipeline::new().with_observer(Box::new(Arc::clone(&metrics)));
    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if args.trace {
        pipeline = pipeline.with_observer(Box::new(TraceObserver));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let result = pipeline.run(&mut sim, args.ticks)?;
    info!(
        ticks = result.ticks,
        stopped_early = result.stopped_early,
        food = result.stats.total_food_found,
        "run finished"
    );

    print_section("Results");
    print_kv("Ticks run", &result.ticks.to_string());
    if result.stopped_early {
        print_kv("Stopped early", "all agents inert");
    }
    print_population(&result.stats);
    {
        let metrics = metrics.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        print_metrics(&metrics.summary());
    }

    if args.save_values {
        for id in best_learners(&sim) {
            let path = app.save_values(&sim, id)?;
            println!("\nSaved values of agent {id} to {}", path.display());
        }
    }

    if let Some(path) = &args.summary {
        result
            .save(path)
            .with_context(|| format!("failed to write summary {}", path.display()))?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["run"];
        argv.extend_from_slice(extra);
        RunArgs::parse_from(argv)
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = build_config(&args(&[
            "--strategy",
            "odor",
            "--agents",
            "3",
            "--width",
            "30",
            "--height",
            "20",
            "--seed",
            "9",
        ]))
        .unwrap();

        assert_eq!(config.strategy, StrategyKind::OdorFollowing);
        assert_eq!(config.initial_agents, 3);
        assert_eq!((config.grid_width, config.grid_height), (30, 20));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_brain_with_method() {
        let config = build_config(&args(&["--strategy", "brain", "--method", "Perceptron"])).unwrap();
        assert_eq!(config.strategy, StrategyKind::Perceptron);

        let config = build_config(&args(&["--method", "Monte-Carlo-Methode"])).unwrap();
        assert_eq!(config.strategy, StrategyKind::MonteCarlo);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(build_config(&args(&["--strategy", "teleport"])).is_err());
        assert!(build_config(&args(&["--strategy", "brain", "--method", "sarsa"])).is_err());
    }

    #[test]
    fn test_invalid_grid_is_rejected() {
        assert!(build_config(&args(&["--width", "0"])).is_err());
    }
}
