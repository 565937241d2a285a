//! MessagePack implementation of the value repository.
//!
//! This adapter stores whole snapshots with rmp_serde for compact binary
//! checkpoints.

use std::{fs::File, path::Path};

use crate::{
    Result,
    error::Error,
    ports::ValueRepository,
    value_store::{SnapshotKind, ValueSnapshot},
};

/// MessagePack-based value repository.
///
/// # Examples
///
/// ```no_run
/// use antforage::adapters::MsgPackRepository;
/// use antforage::ports::ValueRepository;
/// use antforage::value_store::{SnapshotKind, ValueSnapshot};
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let snapshot = ValueSnapshot::default_for(SnapshotKind::Perceptron);
///
/// repo.save(&snapshot, Path::new("perceptron.msgpack"))?;
/// let loaded = repo.load(SnapshotKind::Perceptron, Path::new("perceptron.msgpack"))?;
/// # Ok::<(), antforage::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ValueRepository for MsgPackRepository {
    fn save(&self, snapshot: &ValueSnapshot, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;

        rmp_serde::encode::write(&mut file, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize values to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(())
    }

    fn load(&self, kind: SnapshotKind, path: &Path) -> Result<ValueSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let snapshot: ValueSnapshot =
            rmp_serde::decode::from_read(&file).map_err(|e| Error::SerializationContext {
                operation: "deserialize values from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        if snapshot.kind() != kind {
            return Err(snapshot.mismatch(kind.as_str()));
        }
        if snapshot.is_empty() {
            return Ok(ValueSnapshot::default_for(kind));
        }
        Ok(snapshot)
    }
}
