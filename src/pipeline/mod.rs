//! Run pipeline abstractions
//!
//! This module provides:
//! - A pipeline that drives a simulation tick by tick
//! - Observers recording progress, metrics and traces during a run

pub mod observers;
pub mod run;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver, TraceObserver};
pub use run::{RunPipeline, RunResult};

pub use crate::ports::Observer;
