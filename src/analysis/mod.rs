//! Analysis tools for simulation runs

pub mod stats;

pub use stats::{PopulationStats, StrategyStats};
