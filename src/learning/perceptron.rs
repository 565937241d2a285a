//! Ensemble of linear threshold units, one per direction

use crate::{
    Result,
    types::{Direction, State},
    value_store::{SnapshotKind, UnitRecord, ValueSnapshot, ValueStore},
};

/// Single linear threshold unit over the four state signs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearUnit {
    pub weights: [f64; 4],
    pub bias: f64,
}

impl LinearUnit {
    pub fn new(weights: [f64; 4], bias: f64) -> Self {
        Self { weights, bias }
    }

    /// `1` if `w · x + b >= 0`, else `0`.
    pub fn activate(&self, state: &State) -> u8 {
        let inputs = state.inputs();
        let sum: f64 = self
            .weights
            .iter()
            .zip(inputs)
            .map(|(w, x)| w * x)
            .sum();
        u8::from(sum + self.bias >= 0.0)
    }

    /// Perceptron rule. Returns the error `target - prediction`.
    pub fn train(&mut self, state: &State, target: u8, learning_rate: f64) -> f64 {
        let error = f64::from(target) - f64::from(self.activate(state));
        if error != 0.0 {
            for (weight, input) in self.weights.iter_mut().zip(state.inputs()) {
                *weight += learning_rate * error * input;
            }
            self.bias += learning_rate * error;
        }
        error
    }
}

/// Four units indexed like [`Direction::ALL`]; all start at zero.
#[derive(Debug, Clone)]
pub struct PerceptronEnsemble {
    units: [LinearUnit; 4],
    learning_rate: f64,
}

impl PerceptronEnsemble {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            units: [LinearUnit::default(); 4],
            learning_rate,
        }
    }

    pub fn unit(&self, direction: Direction) -> &LinearUnit {
        &self.units[direction.index()]
    }

    /// Unit outputs for `state`, as scores.
    pub fn activations(&self, state: &State) -> [f64; 4] {
        self.units.map(|unit| f64::from(unit.activate(state)))
    }

    /// Train the unit of the action taken towards `success`.
    pub fn learn(&mut self, state: &State, action: Direction, success: bool) -> f64 {
        let learning_rate = self.learning_rate;
        self.units[action.index()].train(state, u8::from(success), learning_rate)
    }

    pub fn to_records(&self) -> Vec<UnitRecord> {
        Direction::ALL
            .iter()
            .map(|&direction| {
                let unit = self.unit(direction);
                UnitRecord::new(direction, unit.weights, unit.bias)
            })
            .collect()
    }

    /// Load units by action name; actions missing from `records` reset to zero.
    pub fn load_records(&mut self, records: &[UnitRecord]) -> Result<()> {
        let mut units = [LinearUnit::default(); 4];
        for record in records {
            let direction: Direction = record.action.parse()?;
            units[direction.index()] = LinearUnit::new(record.weights(), record.bias);
        }
        self.units = units;
        Ok(())
    }
}

impl ValueStore for PerceptronEnsemble {
    fn snapshot_kind(&self) -> SnapshotKind {
        SnapshotKind::Perceptron
    }

    fn export_snapshot(&self) -> ValueSnapshot {
        ValueSnapshot::Perceptron(self.to_records())
    }

    fn import_snapshot(&mut self, snapshot: &ValueSnapshot) -> Result<()> {
        match snapshot {
            ValueSnapshot::Perceptron(records) => self.load_records(records),
            other => Err(other.mismatch("Perceptron")),
        }
    }

    fn entries(&self) -> usize {
        self.units.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_unit_fires() {
        // 0 + 0 >= 0
        let unit = LinearUnit::default();
        assert_eq!(unit.activate(&State::ZERO), 1);
    }

    #[test]
    fn test_activation_threshold() {
        let unit = LinearUnit::new([1.0, 0.0, 0.0, 0.0], -0.5);
        assert_eq!(unit.activate(&State::from_differences(1, 0, 0, 0)), 1);
        assert_eq!(unit.activate(&State::from_differences(-1, 0, 0, 0)), 0);
    }

    #[test]
    fn test_train_applies_perceptron_rule() {
        let mut unit = LinearUnit::default();
        let state = State::from_differences(-1, 1, 0, 0);

        // Predicts 1, target 0
        let error = unit.train(&state, 0, 0.1);
        assert_eq!(error, -1.0);
        assert_eq!(unit.weights, [0.1, -0.1, 0.0, 0.0]);
        assert!((unit.bias - -0.1).abs() < 1e-12);

        // Correct prediction leaves the unit unchanged
        let before = unit;
        assert_eq!(unit.train(&state, 0, 0.1), 0.0);
        assert_eq!(unit, before);
    }

    #[test]
    fn test_ensemble_learns_only_taken_action() {
        let mut ensemble = PerceptronEnsemble::new(0.1);
        let state = State::from_differences(1, 0, 0, 0);
        ensemble.learn(&state, Direction::Down, false);

        assert_ne!(ensemble.unit(Direction::Down), &LinearUnit::default());
        assert_eq!(ensemble.unit(Direction::Up), &LinearUnit::default());
        assert_eq!(ensemble.activations(&state), [1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_snapshot_roundtrip_and_mismatch() {
        let mut ensemble = PerceptronEnsemble::new(0.1);
        ensemble.learn(&State::from_differences(0, 0, 1, 0), Direction::Left, false);
        let snapshot = ensemble.export_snapshot();

        let mut restored = PerceptronEnsemble::new(0.1);
        restored.import_snapshot(&snapshot).unwrap();
        assert_eq!(restored.to_records(), ensemble.to_records());

        let table = ValueSnapshot::default_for(SnapshotKind::Table);
        assert!(restored.import_snapshot(&table).is_err());
    }
}
