//! Q-table shared by the tabular learning methods

use std::collections::{HashMap, HashSet};

use crate::{
    Result,
    types::{Direction, State},
    value_store::{SnapshotKind, ValueRecord, ValueSnapshot, ValueStore},
};

use super::monte_carlo::EpisodeStep;

/// Q-table mapping (state, action) pairs to Q-values
///
/// Unseen pairs read as `q_init`, which differs between the methods that
/// use the table.
#[derive(Debug, Clone)]
pub struct QTable {
    /// Q-values: (perceived_state, direction) -> Q-value
    q_values: HashMap<(State, Direction), f64>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
    /// Initial Q-value for unseen state-action pairs
    q_init: f64,
}

impl QTable {
    pub fn new(learning_rate: f64, discount_factor: f64, q_init: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
            q_init,
        }
    }

    pub fn get(&self, state: &State, action: Direction) -> f64 {
        self.q_values
            .get(&(*state, action))
            .copied()
            .unwrap_or(self.q_init)
    }

    pub fn set(&mut self, state: State, action: Direction, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Q-values of every direction, indexed like [`Direction::ALL`]
    pub fn scores(&self, state: &State) -> [f64; 4] {
        Direction::ALL.map(|direction| self.get(state, direction))
    }

    /// Maximum Q-value over the four directions
    pub fn max_q(&self, state: &State) -> f64 {
        self.scores(state).into_iter().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the old and new value of Q(s,a).
    pub fn q_learning_update(
        &mut self,
        state: State,
        action: Direction,
        reward: f64,
        next_state: &State,
    ) -> (f64, f64) {
        let current_q = self.get(&state, action);
        let td_target = reward + self.discount_factor * self.max_q(next_state);
        let new_q = current_q + self.learning_rate * (td_target - current_q);
        self.set(state, action, new_q);
        (current_q, new_q)
    }

    /// First-visit Monte Carlo backup over a finished episode
    ///
    /// Walks the episode from its last step to its first with the running
    /// return g ← r + γg. Each (s,a) is updated once, with the return of its
    /// latest occurrence: Q(s,a) ← Q(s,a) + α[g - Q(s,a)].
    ///
    /// Returns the number of pairs updated.
    pub fn monte_carlo_update(&mut self, episode: &[EpisodeStep]) -> usize {
        let mut visited = HashSet::new();
        let mut g = 0.0;

        for step in episode.iter().rev() {
            g = step.reward + self.discount_factor * g;
            if !visited.insert((step.state, step.action)) {
                continue;
            }
            let current_q = self.get(&step.state, step.action);
            self.set(
                step.state,
                step.action,
                current_q + self.learning_rate * (g - current_q),
            );
        }

        visited.len()
    }

    pub fn q_init(&self) -> f64 {
        self.q_init
    }

    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Number of stored Q-values
    pub fn size(&self) -> usize {
        self.q_values.len()
    }

    /// Stored entries ordered by state key, then direction
    pub fn to_records(&self) -> Vec<ValueRecord> {
        let mut entries: Vec<_> = self.q_values.iter().collect();
        entries.sort_by_key(|((state, action), _)| (*state, action.index()));
        entries
            .into_iter()
            .map(|((state, action), value)| ValueRecord::new(*state, *action, *value))
            .collect()
    }

    /// Replace the table contents with `records`.
    ///
    /// An empty list installs the default record set instead.
    pub fn load_records(&mut self, records: &[ValueRecord]) -> Result<()> {
        let defaults;
        let records = if records.is_empty() {
            defaults = ValueRecord::defaults();
            defaults.as_slice()
        } else {
            records
        };

        let mut q_values = HashMap::with_capacity(records.len());
        for record in records {
            let (state, action) = record.key()?;
            q_values.insert((state, action), record.value);
        }
        self.q_values = q_values;
        Ok(())
    }
}

impl ValueStore for QTable {
    fn snapshot_kind(&self) -> SnapshotKind {
        SnapshotKind::Table
    }

    fn export_snapshot(&self) -> ValueSnapshot {
        ValueSnapshot::Table(self.to_records())
    }

    fn import_snapshot(&mut self, snapshot: &ValueSnapshot) -> Result<()> {
        match snapshot {
            ValueSnapshot::Table(records) => self.load_records(records),
            other => Err(other.mismatch("tabular")),
        }
    }

    fn entries(&self) -> usize {
        self.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(key: &str) -> State {
        State::parse(key).unwrap()
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new(0.1, 0.9, -1.0);
        assert_eq!(qtable.get(&State::ZERO, Direction::Up), -1.0);
        assert_eq!(qtable.size(), 0);
    }

    #[test]
    fn test_max_q() {
        let mut qtable = QTable::new(0.1, 0.9, 0.0);
        let s = state("1:0:-1:0");
        qtable.set(s, Direction::Up, 0.5);
        qtable.set(s, Direction::Left, 1.5);
        qtable.set(s, Direction::Right, -0.8);
        assert_eq!(qtable.max_q(&s), 1.5);
        assert_eq!(qtable.scores(&s), [0.5, 0.0, 1.5, -0.8]);
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new(0.5, 0.9, 0.0);
        let s = state("0:0:0:0");
        let next = state("1:-1:0:0");
        qtable.set(next, Direction::Up, 2.0);

        let (old, new) = qtable.q_learning_update(s, Direction::Up, -0.2, &next);

        // 0.0 + 0.5 * (-0.2 + 0.9 * 2.0 - 0.0) = 0.8
        assert_eq!(old, 0.0);
        assert!((new - 0.8).abs() < 1e-12);
        assert_eq!(qtable.get(&s, Direction::Up), new);
    }

    #[test]
    fn test_q_learning_update_decays_without_reward() {
        let mut qtable = QTable::new(0.1, 0.0, 0.0);
        let s = state("1:0:0:0");
        qtable.set(s, Direction::Down, 3.0);

        qtable.q_learning_update(s, Direction::Down, 0.0, &State::ZERO);
        assert!((qtable.get(&s, Direction::Down) - 0.9 * 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_monte_carlo_single_step() {
        let mut qtable = QTable::new(0.1, 0.9, -1.0);
        let s = state("0:1:0:0");
        let updated = qtable.monte_carlo_update(&[EpisodeStep::new(s, Direction::Down, 1.0)]);

        assert_eq!(updated, 1);
        // -1 + 0.1 * (1 - -1)
        assert!((qtable.get(&s, Direction::Down) - (-0.8)).abs() < 1e-12);
    }

    #[test]
    fn test_monte_carlo_first_visit_uses_latest_return() {
        let mut qtable = QTable::new(0.1, 0.9, 0.0);
        let s = state("0:0:1:0");
        let episode = [
            EpisodeStep::new(s, Direction::Left, 1.0),
            EpisodeStep::new(s, Direction::Left, 2.0),
        ];

        assert_eq!(qtable.monte_carlo_update(&episode), 1);
        // Only g = 2.0 from the last step is applied
        assert!((qtable.get(&s, Direction::Left) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_monte_carlo_discounts_earlier_steps() {
        let mut qtable = QTable::new(1.0, 0.5, 0.0);
        let a = state("1:0:0:0");
        let b = state("0:1:0:0");
        let episode = [
            EpisodeStep::new(a, Direction::Up, -0.2),
            EpisodeStep::new(b, Direction::Down, 9.8),
        ];

        qtable.monte_carlo_update(&episode);
        assert!((qtable.get(&b, Direction::Down) - 9.8).abs() < 1e-12);
        assert!((qtable.get(&a, Direction::Up) - (-0.2 + 0.5 * 9.8)).abs() < 1e-12);
    }

    #[test]
    fn test_records_sorted_and_reloadable() {
        let mut qtable = QTable::new(0.1, 0.9, 0.0);
        qtable.set(state("1:0:0:0"), Direction::Right, 0.25);
        qtable.set(state("-1:0:0:0"), Direction::Up, -0.5);

        let records = qtable.to_records();
        assert_eq!(records[0].state, "-1:0:0:0");
        assert_eq!(records[1].action, "right");

        let mut reloaded = QTable::new(0.1, 0.9, 0.0);
        reloaded.load_records(&records).unwrap();
        assert_eq!(reloaded.get(&state("1:0:0:0"), Direction::Right), 0.25);
    }

    #[test]
    fn test_empty_records_install_defaults() {
        let mut qtable = QTable::new(0.1, 0.9, -1.0);
        qtable.set(state("1:1:1:1"), Direction::Up, 4.0);
        qtable.load_records(&[]).unwrap();

        assert_eq!(qtable.size(), 4);
        assert_eq!(qtable.get(&State::ZERO, Direction::Left), 0.0);
        assert_eq!(qtable.get(&state("1:1:1:1"), Direction::Up), -1.0);
    }

    #[test]
    fn test_rejects_malformed_records() {
        let mut qtable = QTable::new(0.1, 0.9, 0.0);
        let bad = ValueRecord {
            state: "0:0:0".to_string(),
            action: "up".to_string(),
            value: 1.0,
        };
        assert!(qtable.load_records(&[bad]).is_err());
    }
}
