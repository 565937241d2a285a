//! CSV implementation of the value repository.
//!
//! Tables are stored as `state,action,value` rows with colon-joined state
//! keys; perceptron ensembles as one `action,bias,w_up,w_down,w_left,w_right`
//! row per unit.

use std::{fs::File, io::Read, path::Path};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Result,
    error::Error,
    ports::ValueRepository,
    value_store::{SnapshotKind, ValueSnapshot},
};

/// CSV-based value repository, the format of the `*.csv` value files.
///
/// # Examples
///
/// ```no_run
/// use antforage::adapters::CsvRepository;
/// use antforage::ports::ValueRepository;
/// use antforage::value_store::{SnapshotKind, ValueSnapshot};
/// use std::path::Path;
///
/// let repo = CsvRepository::new();
/// let snapshot = ValueSnapshot::default_for(SnapshotKind::Table);
/// repo.save(&snapshot, Path::new("Q-Learning.csv"))?;
/// let loaded = repo.load(SnapshotKind::Table, Path::new("Q-Learning.csv"))?;
/// # Ok::<(), antforage::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRepository;

impl CsvRepository {
    pub fn new() -> Self {
        Self
    }
}

fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create file {path:?}"),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| Error::Io {
        operation: format!("flush file {path:?}"),
        source,
    })?;
    Ok(())
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    csv::Reader::from_reader(reader)
        .deserialize()
        .map(|row| row.map_err(Error::from))
        .collect()
}

impl ValueRepository for CsvRepository {
    fn save(&self, snapshot: &ValueSnapshot, path: &Path) -> Result<()> {
        match snapshot {
            ValueSnapshot::Table(records) => write_rows(records, path),
            ValueSnapshot::Perceptron(units) => write_rows(units, path),
        }
    }

    fn load(&self, kind: SnapshotKind, path: &Path) -> Result<ValueSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let snapshot = match kind {
            SnapshotKind::Table => ValueSnapshot::Table(read_rows(file)?),
            SnapshotKind::Perceptron => ValueSnapshot::Perceptron(read_rows(file)?),
        };

        if snapshot.is_empty() {
            Ok(ValueSnapshot::default_for(kind))
        } else {
            Ok(snapshot)
        }
    }
}
