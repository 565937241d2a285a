//! Common test utilities for the antforage test suite.

#![allow(dead_code)]

use antforage::{
    Position, Simulation, SimulationConfig, StrategyKind,
    app::LearningConfig,
    identifiers::AgentId,
};

/// Assert two floats agree to within `1e-9`.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Learning constants with exploration switched off.
pub fn greedy_learning() -> LearningConfig {
    LearningConfig {
        exploration_rate: 0.0,
        ..LearningConfig::default()
    }
}

/// A 10×10 grid with no random food and no initial agents.
pub fn empty_config(seed: u64) -> SimulationConfig {
    SimulationConfig::default()
        .with_grid(10, 10)
        .with_food(0, 10)
        .with_agents(0)
        .with_seed(seed)
}

/// One 10-calorie food at (5,5) and one agent of `kind` directly below it.
pub fn food_scenario(kind: StrategyKind, config: SimulationConfig) -> (Simulation, AgentId) {
    let mut sim = Simulation::new(config).expect("valid config");
    sim.environment_mut()
        .place_food(Position::new(5, 5), 10)
        .expect("food on grid");
    let id = sim
        .spawn_agent_at(kind, Position::new(5, 6))
        .expect("agent on grid");
    (sim, id)
}
