//! Learned-parameter containers and their persistence snapshots.
//!
//! A [`ValueStore`] is owned by exactly one learning strategy. Persistence
//! never borrows it: values cross that boundary only as a [`ValueSnapshot`]
//! produced by `export_snapshot` or consumed by `import_snapshot`.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    types::{Direction, State},
};

/// One Q-value as persisted: `state` is the colon-joined key, `action` a
/// direction name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    pub state: String,
    pub action: String,
    pub value: f64,
}

impl ValueRecord {
    pub fn new(state: State, action: Direction, value: f64) -> Self {
        Self {
            state: state.key(),
            action: action.as_str().to_string(),
            value,
        }
    }

    /// One zero-valued record per direction at the all-zero state.
    pub fn defaults() -> Vec<Self> {
        Direction::ALL
            .iter()
            .map(|&direction| Self::new(State::ZERO, direction, 0.0))
            .collect()
    }

    /// Parse the record's state key and action name.
    pub fn key(&self) -> Result<(State, Direction)> {
        Ok((State::parse(&self.state)?, self.action.parse()?))
    }
}

/// One perceptron unit as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub action: String,
    pub bias: f64,
    pub w_up: f64,
    pub w_down: f64,
    pub w_left: f64,
    pub w_right: f64,
}

impl UnitRecord {
    pub fn new(action: Direction, weights: [f64; 4], bias: f64) -> Self {
        let [w_up, w_down, w_left, w_right] = weights;
        Self {
            action: action.as_str().to_string(),
            bias,
            w_up,
            w_down,
            w_left,
            w_right,
        }
    }

    pub fn defaults() -> Vec<Self> {
        Direction::ALL
            .iter()
            .map(|&direction| Self::new(direction, [0.0; 4], 0.0))
            .collect()
    }

    pub fn weights(&self) -> [f64; 4] {
        [self.w_up, self.w_down, self.w_left, self.w_right]
    }
}

/// Shape of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    Table,
    Perceptron,
}

impl SnapshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Table => "table",
            SnapshotKind::Perceptron => "perceptron",
        }
    }
}

/// Detached copy of a value store's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSnapshot {
    Table(Vec<ValueRecord>),
    Perceptron(Vec<UnitRecord>),
}

impl ValueSnapshot {
    /// The record set used when nothing has been persisted yet.
    pub fn default_for(kind: SnapshotKind) -> Self {
        match kind {
            SnapshotKind::Table => ValueSnapshot::Table(ValueRecord::defaults()),
            SnapshotKind::Perceptron => ValueSnapshot::Perceptron(UnitRecord::defaults()),
        }
    }

    pub fn kind(&self) -> SnapshotKind {
        match self {
            ValueSnapshot::Table(_) => SnapshotKind::Table,
            ValueSnapshot::Perceptron(_) => SnapshotKind::Perceptron,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ValueSnapshot::Table(records) => records.len(),
            ValueSnapshot::Perceptron(units) => units.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Error for importing this snapshot into a store of another shape.
    pub(crate) fn mismatch(&self, strategy: &str) -> Error {
        Error::SnapshotMismatch {
            strategy: strategy.to_string(),
            snapshot: self.kind().as_str().to_string(),
        }
    }
}

/// Learned parameters with a uniform export/import contract.
pub trait ValueStore {
    fn snapshot_kind(&self) -> SnapshotKind;

    /// Copy the current parameters out.
    fn export_snapshot(&self) -> ValueSnapshot;

    /// Replace the current parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotMismatch`] for a snapshot of the wrong shape
    /// and parse errors for malformed records. The store is left unchanged
    /// on error.
    fn import_snapshot(&mut self, snapshot: &ValueSnapshot) -> Result<()>;

    /// Number of stored parameters entries.
    fn entries(&self) -> usize;
}
