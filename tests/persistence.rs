//! Learned values surviving a round trip through value files on disk.
//!
//! These tests use the production `CsvRepository` against a temporary
//! directory, the way the binary reads and writes the method files.

mod common;

use std::fs;

use antforage::{
    App, Direction, Error, SimulationConfig, State, StrategyKind, ValueSnapshot,
    adapters::{CsvRepository, MsgPackRepository},
    ports::ValueRepository,
    value_store::{SnapshotKind, UnitRecord, ValueRecord},
};
use common::{empty_config, food_scenario};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> SimulationConfig {
    SimulationConfig::default()
        .with_grid(30, 30)
        .with_food(3, 40)
        .with_agents(0)
        .with_seed(12)
        .with_persistence_dir(dir.path())
}

#[test]
fn test_trained_table_is_reloaded_by_next_simulation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let app = App::new();

    let mut sim = app.create_simulation(config_in(&temp_dir)).unwrap();
    let id = app
        .spawn_agents(&mut sim, StrategyKind::QLearning, 1)
        .unwrap()[0];
    for _ in 0..50 {
        sim.tick();
    }
    let trained = sim.export_values(id).unwrap();
    let path = app.save_values(&sim, id).unwrap();
    assert_eq!(path, temp_dir.path().join("Q-Learning.csv"));

    let mut next = app.create_simulation(config_in(&temp_dir)).unwrap();
    let reloaded = app
        .spawn_agents(&mut next, StrategyKind::QLearning, 1)
        .unwrap()[0];

    let ValueSnapshot::Table(mut before) = trained else {
        panic!("Q-Learning exports a table");
    };
    let ValueSnapshot::Table(mut after) = next.export_values(reloaded).unwrap() else {
        panic!("Q-Learning exports a table");
    };
    before.sort_by(|a, b| (&a.state, &a.action).cmp(&(&b.state, &b.action)));
    after.sort_by(|a, b| (&a.state, &a.action).cmp(&(&b.state, &b.action)));
    assert_eq!(before, after);
}

#[test]
fn test_missing_file_starts_from_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let app = App::new();
    let mut sim = app.create_simulation(config_in(&temp_dir)).unwrap();

    let ids = app
        .spawn_agents(&mut sim, StrategyKind::MonteCarlo, 2)
        .unwrap();
    for id in ids {
        assert_eq!(
            sim.export_values(id).unwrap(),
            ValueSnapshot::default_for(SnapshotKind::Table)
        );
    }
}

#[test]
fn test_perceptron_file_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("Perceptron.csv");
    fs::write(
        &path,
        "action,bias,w_up,w_down,w_left,w_right\n\
         up,-0.1,0.2,-0.2,0,0\n\
         left,0.3,0,0,0.1,-0.1\n",
    )
    .unwrap();

    let app = App::new();
    let mut sim = app.create_simulation(config_in(&temp_dir)).unwrap();
    let id = app
        .spawn_agents(&mut sim, StrategyKind::Perceptron, 1)
        .unwrap()[0];

    let ValueSnapshot::Perceptron(units) = sim.export_values(id).unwrap() else {
        panic!("Perceptron exports unit records");
    };
    assert_eq!(units.len(), 4);
    assert_eq!(
        units[0],
        UnitRecord::new(Direction::Up, [0.2, -0.2, 0.0, 0.0], -0.1)
    );
    // Units absent from the file start at zero
    assert_eq!(units[1], UnitRecord::new(Direction::Down, [0.0; 4], 0.0));
    assert_eq!(
        units[2],
        UnitRecord::new(Direction::Left, [0.0, 0.0, 0.1, -0.1], 0.3)
    );
}

#[test]
fn test_malformed_value_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        temp_dir.path().join("Q-Learning.csv"),
        "state,action,value\n0:0:0:5,up,1.0\n",
    )
    .unwrap();
    let app = App::new();

    let sim = app
        .create_simulation(
            config_in(&temp_dir)
                .with_strategy(StrategyKind::QLearning)
                .with_agents(2),
        )
        .unwrap();

    assert_eq!(sim.population().len(), 2);
    for agent in sim.population().iter() {
        assert_eq!(
            sim.export_values(agent.id()).unwrap(),
            ValueSnapshot::default_for(SnapshotKind::Table)
        );
    }
}

#[test]
fn test_spawning_with_bad_action_names_spawns_every_agent() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        temp_dir.path().join("Q-Learning.csv"),
        "state,action,value\n0:0:0:0,sideways,1.0\n",
    )
    .unwrap();
    let app = App::new();

    let mut sim = app.create_simulation(config_in(&temp_dir)).unwrap();
    let ids = app
        .spawn_agents(&mut sim, StrategyKind::QLearning, 3)
        .unwrap();

    assert_eq!(ids.len(), 3);
    assert_eq!(sim.population().len(), 3);
}

#[test]
fn test_importing_wrong_snapshot_kind_fails() {
    let (mut sim, id) = food_scenario(StrategyKind::QLearning, empty_config(2));
    let result = sim.import_values(id, &ValueSnapshot::default_for(SnapshotKind::Perceptron));
    assert!(matches!(result, Err(Error::SnapshotMismatch { .. })));

    let odor = sim
        .spawn_agent_at(StrategyKind::OdorFollowing, antforage::Position::new(1, 1))
        .unwrap();
    assert!(matches!(
        sim.export_values(odor),
        Err(Error::NoValueStore { .. })
    ));
}

#[test]
fn test_csv_and_msgpack_agree() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let snapshot = ValueSnapshot::Table(vec![
        ValueRecord::new(State::from_differences(1, -1, 0, 0), Direction::Up, 0.1 + 0.2),
        ValueRecord::new(State::from_differences(0, 0, -1, 1), Direction::Right, -1.0 / 3.0),
    ]);

    let csv_path = temp_dir.path().join("values.csv");
    let mpk_path = temp_dir.path().join("values.msgpack");
    CsvRepository::new().save(&snapshot, &csv_path).unwrap();
    MsgPackRepository::new().save(&snapshot, &mpk_path).unwrap();

    let from_csv = CsvRepository::new().load(SnapshotKind::Table, &csv_path).unwrap();
    let from_mpk = MsgPackRepository::new()
        .load(SnapshotKind::Table, &mpk_path)
        .unwrap();
    assert_eq!(from_csv, snapshot);
    assert_eq!(from_mpk, snapshot);
}
