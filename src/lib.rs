//! Foraging ants on a toroidal scent grid
//!
//! This crate provides:
//! - A grid environment with food items and a derived scent field
//! - Agents that move by random walk, by following the scent, or by learning
//!   with Monte Carlo control, Q-Learning or a perceptron ensemble
//! - A population-level simulation with per-agent episode logs
//! - Persistence of learned values as CSV or MessagePack
//! - A run pipeline with observers for progress, metrics and JSONL traces

pub mod adapters;
pub mod agent;
pub mod analysis;
pub mod app;
pub mod cli;
pub mod episode_log;
pub mod error;
pub mod identifiers;
pub mod learning;
pub mod pipeline;
pub mod population;
pub mod ports;
pub mod simulation;
pub mod types;
pub mod value_store;
pub mod world;

pub use agent::{Agent, AgentStatus, AgentStep, FoodEvent};
pub use app::{App, SimulationConfig};
pub use episode_log::{EpisodeLog, PeriodEvent};
pub use error::{Error, Result};
pub use identifiers::{AgentId, FoodId};
pub use learning::{LearningStrategy, StrategyKind};
pub use population::AgentPopulation;
pub use simulation::{Simulation, TickReport};
pub use types::{Direction, Position, State};
pub use value_store::{ValueSnapshot, ValueStore};
pub use world::{Environment, ScentField};
