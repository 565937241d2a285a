//! Monte Carlo control with an episode buffer

use serde::{Deserialize, Serialize};

use crate::types::{Direction, State};

use super::q_table::QTable;

/// Unseen pairs start pessimistic, unlike Q-learning.
pub const Q_INIT: f64 = -1.0;

/// One (s, a, r) triple of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStep {
    pub state: State,
    pub action: Direction,
    pub reward: f64,
}

impl EpisodeStep {
    pub fn new(state: State, action: Direction, reward: f64) -> Self {
        Self {
            state,
            action,
            reward,
        }
    }
}

/// Tabular Monte Carlo control.
///
/// Steps accumulate in the episode buffer until food is found, then one
/// first-visit backward pass updates the table and the buffer is cleared.
#[derive(Debug, Clone)]
pub struct MonteCarloControl {
    q_table: QTable,
    episode: Vec<EpisodeStep>,
}

impl MonteCarloControl {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_table: QTable::new(learning_rate, discount_factor, Q_INIT),
            episode: Vec::new(),
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable {
        &mut self.q_table
    }

    pub fn episode(&self) -> &[EpisodeStep] {
        &self.episode
    }

    pub fn record(&mut self, step: EpisodeStep) {
        self.episode.push(step);
    }

    /// Back up the buffered episode and clear it.
    ///
    /// Returns `(steps, updated)`: the episode length and the number of
    /// distinct pairs updated.
    pub fn finish_episode(&mut self) -> (usize, usize) {
        let steps = self.episode.len();
        let updated = self.q_table.monte_carlo_update(&self.episode);
        self.episode.clear();
        (steps, updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_step_episode() {
        let mut mc = MonteCarloControl::new(0.1, 0.9);
        let s = State::from_differences(1, 0, 0, 0);
        mc.record(EpisodeStep::new(s, Direction::Up, 1.0));

        assert_eq!(mc.finish_episode(), (1, 1));
        let old = Q_INIT;
        assert!((mc.q_table().get(&s, Direction::Up) - (old + 0.1 * (1.0 - old))).abs() < 1e-12);
        assert!(mc.episode().is_empty());
    }

    #[test]
    fn test_buffer_grows_until_finished() {
        let mut mc = MonteCarloControl::new(0.1, 0.9);
        for _ in 0..5 {
            mc.record(EpisodeStep::new(State::ZERO, Direction::Left, -0.2));
        }
        assert_eq!(mc.episode().len(), 5);
        assert_eq!(mc.q_table().size(), 0);

        assert_eq!(mc.finish_episode(), (5, 1));
        assert_eq!(mc.q_table().size(), 1);
    }
}
