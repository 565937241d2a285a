//! Tests for the run pipeline and its observers

mod common;

use std::sync::{Arc, Mutex};

use antforage::{
    Simulation, SimulationConfig, StrategyKind,
    agent::FoodEvent,
    episode_log::PeriodEvent,
    pipeline::{MetricsObserver, Observer, RunPipeline},
    simulation::TickReport,
};
use common::{empty_config, food_scenario};

#[derive(Default)]
struct PeriodCollector {
    periods: Vec<PeriodEvent>,
    food: Vec<FoodEvent>,
    reports: usize,
}

impl Observer for PeriodCollector {
    fn on_period_advanced(&mut self, event: &PeriodEvent) -> antforage::Result<()> {
        self.periods.push(event.clone());
        Ok(())
    }

    fn on_food_found(&mut self, event: &FoodEvent) -> antforage::Result<()> {
        self.food.push(event.clone());
        Ok(())
    }

    fn on_tick_end(&mut self, _report: &TickReport) -> antforage::Result<()> {
        self.reports += 1;
        Ok(())
    }
}

#[test]
fn test_basic_run() {
    let config = SimulationConfig::default()
        .with_grid(40, 40)
        .with_strategy(StrategyKind::Random)
        .with_agents(5)
        .with_seed(42);
    let mut sim = Simulation::new(config).unwrap();

    let result = RunPipeline::new().run(&mut sim, 100).unwrap();

    assert_eq!(result.ticks, 100);
    assert_eq!(result.stats.agents, 5);
    assert_eq!(result.stats.live_agents, 5);
    assert_eq!(result.failures, 0);
    assert!(sim.population().iter().all(|agent| agent.steps() == 100));
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed: u64| {
        let config = SimulationConfig::default()
            .with_grid(30, 30)
            .with_strategy(StrategyKind::QLearning)
            .with_agents(3)
            .with_seed(seed);
        let mut sim = Simulation::new(config).unwrap();
        RunPipeline::new().run(&mut sim, 200).unwrap();
        sim.population()
            .iter()
            .map(|agent| (agent.position(), agent.energy(), agent.food_found()))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(99), run(99));
}

#[test]
fn test_observers_see_every_period_and_food() {
    let collector = Arc::new(Mutex::new(PeriodCollector::default()));
    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let (mut sim, id) = food_scenario(StrategyKind::OdorFollowing, empty_config(6));

    RunPipeline::new()
        .with_observer(Box::new(Arc::clone(&collector)))
        .with_observer(Box::new(Arc::clone(&metrics)))
        .run(&mut sim, 3)
        .unwrap();

    let collector = collector.lock().unwrap();
    assert_eq!(collector.reports, 3);
    assert_eq!(collector.periods.len(), 3);
    assert!(collector.periods.iter().all(|period| period.agent == id));
    assert_eq!(
        collector.periods.iter().map(|p| p.period).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(collector.food.len(), 1);

    let summary = metrics.lock().unwrap().summary();
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.agent_steps, 3);
    assert_eq!(summary.food_found, 1);
    assert_eq!(summary.first_food_tick, Some(1));
}

#[test]
fn test_settings_between_ticks() {
    let config = SimulationConfig::default()
        .with_grid(25, 25)
        .with_food(2, 30)
        .with_agents(1)
        .with_seed(8);
    let mut sim = Simulation::new(config).unwrap();
    RunPipeline::new().run(&mut sim, 5).unwrap();

    sim.set_desired_food(6);
    assert_eq!(sim.environment().foods().len(), 6);

    sim.set_spawn_strategy(StrategyKind::Perceptron);
    let spawned = sim.spawn_agents(2);
    assert_eq!(spawned.len(), 2);
    assert!(
        spawned
            .iter()
            .all(|&id| sim.agent(id).unwrap().kind() == StrategyKind::Perceptron)
    );

    sim.reset();
    assert!(sim.population().is_empty());
    assert_eq!(sim.tick_count(), 0);
    assert_eq!(sim.environment().foods().len(), 6);

    let snapshot = sim.render_snapshot();
    assert_eq!(snapshot.foods.len(), 6);
    assert!(snapshot.agents.is_empty());
}
