//! Observer port - sink for simulation events
//!
//! Observers receive what happened during a run without the simulation
//! core knowing how it is displayed, stored or aggregated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    Result,
    agent::FoodEvent,
    episode_log::PeriodEvent,
    identifiers::AgentId,
    simulation::{Simulation, TickReport},
};

/// Observer trait for monitoring a run
///
/// # Event Sequence
///
/// 1. `on_run_start(total_ticks, sim)` - once
/// 2. For each tick:
///    - `on_tick_start(tick)`
///    - `on_period_advanced(event)` - per agent that moved
///    - `on_food_found(event)` - per food reached
///    - `on_agent_exhausted(agent)` - per agent that ran out of energy
///    - `on_tick_end(report)`
/// 3. `on_run_end(sim)` - once
///
/// # Examples
///
/// ```no_run
/// use antforage::{agent::FoodEvent, ports::Observer};
///
/// struct FoodCounter {
///     found: usize,
/// }
///
/// impl Observer for FoodCounter {
///     fn on_food_found(&mut self, _event: &FoodEvent) -> antforage::Result<()> {
///         self.found += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    fn on_run_start(&mut self, _total_ticks: u64, _sim: &Simulation) -> Result<()> {
        Ok(())
    }

    fn on_tick_start(&mut self, _tick: u64) -> Result<()> {
        Ok(())
    }

    /// Called with the text of each closed episode-log period.
    fn on_period_advanced(&mut self, _event: &PeriodEvent) -> Result<()> {
        Ok(())
    }

    fn on_food_found(&mut self, _event: &FoodEvent) -> Result<()> {
        Ok(())
    }

    fn on_agent_exhausted(&mut self, _agent: AgentId) -> Result<()> {
        Ok(())
    }

    fn on_tick_end(&mut self, _report: &TickReport) -> Result<()> {
        Ok(())
    }

    /// Last call of a run. Use it to flush outputs or print summaries.
    fn on_run_end(&mut self, _sim: &Simulation) -> Result<()> {
        Ok(())
    }
}

/// A shared observer, so callers keep a handle to read results after a run.
impl<O: Observer> Observer for Arc<Mutex<O>> {
    fn on_run_start(&mut self, total_ticks: u64, sim: &Simulation) -> Result<()> {
        lock(self).on_run_start(total_ticks, sim)
    }

    fn on_tick_start(&mut self, tick: u64) -> Result<()> {
        lock(self).on_tick_start(tick)
    }

    fn on_period_advanced(&mut self, event: &PeriodEvent) -> Result<()> {
        lock(self).on_period_advanced(event)
    }

    fn on_food_found(&mut self, event: &FoodEvent) -> Result<()> {
        lock(self).on_food_found(event)
    }

    fn on_agent_exhausted(&mut self, agent: AgentId) -> Result<()> {
        lock(self).on_agent_exhausted(agent)
    }

    fn on_tick_end(&mut self, report: &TickReport) -> Result<()> {
        lock(self).on_tick_end(report)
    }

    fn on_run_end(&mut self, sim: &Simulation) -> Result<()> {
        lock(self).on_run_end(sim)
    }
}

fn lock<O>(shared: &Mutex<O>) -> MutexGuard<'_, O> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
