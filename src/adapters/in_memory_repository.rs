//! In-memory value repository for testing.
//!
//! This adapter keeps snapshots in a shared map, enabling fast tests
//! without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result,
    error::Error,
    ports::ValueRepository,
    value_store::{SnapshotKind, ValueSnapshot},
};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use antforage::adapters::InMemoryRepository;
/// use antforage::ports::ValueRepository;
/// use antforage::value_store::{SnapshotKind, ValueSnapshot};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let snapshot = ValueSnapshot::default_for(SnapshotKind::Table);
///
/// repo.save(&snapshot, Path::new("Q-Learning.csv"))?;
/// let loaded = repo.load(SnapshotKind::Table, Path::new("Q-Learning.csv"))?;
/// assert_eq!(loaded, snapshot);
/// # Ok::<(), antforage::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored snapshots.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl ValueRepository for InMemoryRepository {
    fn save(&self, snapshot: &ValueSnapshot, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec(snapshot).map_err(|e| Error::SerializationContext {
            operation: "serialize values for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, kind: SnapshotKind, path: &Path) -> Result<ValueSnapshot> {
        let storage = self.storage();
        let bytes = storage.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load values from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        let snapshot: ValueSnapshot =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
                operation: "deserialize values from in-memory storage".to_string(),
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
