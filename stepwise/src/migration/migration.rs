use crate::collection::RecordId;
use crate::errors::MigrateResult;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A forward or backward migration function.
///
/// Receives the caller's database handle and reports success or failure.
pub type MigrationFn<D> = Arc<dyn Fn(&D) -> MigrateResult<()> + Send + Sync>;

/// A versioned change unit.
///
/// The `version` is the only field used for ordering and identity. Cloning a
/// migration shares its functions.
///
/// ```rust
/// use stepwise::migration::Migration;
///
/// let migration: Migration<Vec<String>> = Migration::new(
///     1,
///     |_db| Ok(()),
///     |_db| Ok(()),
/// );
/// assert_eq!(migration.version(), 1);
/// assert!(migration.id().is_none());
/// ```
pub struct Migration<D> {
    version: i64,
    id: Option<RecordId>,
    forward: MigrationFn<D>,
    backward: MigrationFn<D>,
}

impl<D> Migration<D> {
    pub fn new<F, B>(version: i64, forward: F, backward: B) -> Self
    where
        F: Fn(&D) -> MigrateResult<()> + Send + Sync + 'static,
        B: Fn(&D) -> MigrateResult<()> + Send + Sync + 'static,
    {
        Migration {
            version,
            id: None,
            forward: Arc::new(forward),
            backward: Arc::new(backward),
        }
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Identifier of the marker record, once a store assigned one.
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn forward(&self) -> &MigrationFn<D> {
        &self.forward
    }

    pub fn backward(&self) -> &MigrationFn<D> {
        &self.backward
    }

    /// Runs the forward function against `db`.
    pub fn apply(&self, db: &D) -> MigrateResult<()> {
        (self.forward)(db)
    }

    /// Runs the backward function against `db`.
    pub fn revert(&self, db: &D) -> MigrateResult<()> {
        (self.backward)(db)
    }
}

impl<D> Clone for Migration<D> {
    fn clone(&self) -> Self {
        Migration {
            version: self.version,
            id: self.id,
            forward: self.forward.clone(),
            backward: self.backward.clone(),
        }
    }
}

impl<D> Debug for Migration<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("id", &self.id)
            .field("forward", &"<fn>")
            .field("backward", &"<fn>")
            .finish()
    }
}
