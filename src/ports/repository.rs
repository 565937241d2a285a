//! Repository port for learned-value persistence.

use std::path::Path;

use crate::{
    Result,
    value_store::{SnapshotKind, ValueSnapshot},
};

/// Port for persisting and loading value snapshots.
///
/// # Examples
///
/// ```no_run
/// use antforage::ports::ValueRepository;
/// use antforage::value_store::ValueSnapshot;
/// use std::path::Path;
///
/// fn save_values<R: ValueRepository>(
///     repo: &R,
///     snapshot: &ValueSnapshot,
///     path: &Path,
/// ) -> antforage::Result<()> {
///     repo.save(snapshot, path)
/// }
/// ```
pub trait ValueRepository {
    /// Save a snapshot to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be created or written.
    fn save(&self, snapshot: &ValueSnapshot, path: &Path) -> Result<()>;

    /// Load a snapshot of shape `kind` from `path`.
    ///
    /// An existing but empty source yields the default record set.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing, unreadable or malformed.
    fn load(&self, kind: SnapshotKind, path: &Path) -> Result<ValueSnapshot>;
}
