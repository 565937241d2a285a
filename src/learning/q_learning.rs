//! Online Q-learning

use crate::types::{Direction, State};

use super::q_table::QTable;

pub const Q_INIT: f64 = 0.0;

/// Tabular Q-learning: one TD update per transition, no episode boundary.
#[derive(Debug, Clone)]
pub struct QLearning {
    q_table: QTable,
}

impl QLearning {
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_table: QTable::new(learning_rate, discount_factor, Q_INIT),
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_mut(&mut self) -> &mut QTable {
        &mut self.q_table
    }

    pub fn scores(&self, state: &State) -> [f64; 4] {
        self.q_table.scores(state)
    }

    /// Apply the update for `state --action--> next_state`, returning the old and new Q(s,a).
    pub fn learn(
        &mut self,
        state: State,
        action: Direction,
        reward: f64,
        next_state: &State,
    ) -> (f64, f64) {
        self.q_table
            .q_learning_update(state, action, reward, next_state)
    }
}
