use super::Migration;
use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Catalog of migrations keyed by version.
///
/// The registry is an explicit object owned by the caller; clones are cheap
/// and share the same entries. Mutations take the lock exclusively, reads take
/// it shared, so registration from several threads is safe.
///
/// # Examples
///
/// ```rust
/// use stepwise::errors::ErrorKind;
/// use stepwise::migration::MigrationRegistry;
///
/// let registry: MigrationRegistry<()> = MigrationRegistry::new();
/// registry.register(2, |_| Ok(()), |_| Ok(())).unwrap();
/// registry.register(1, |_| Ok(()), |_| Ok(())).unwrap();
///
/// assert_eq!(registry.versions(false), vec![1, 2]);
/// assert_eq!(registry.versions(true), vec![2, 1]);
///
/// let err = registry.register(1, |_| Ok(()), |_| Ok(())).unwrap_err();
/// assert_eq!(err.kind(), &ErrorKind::DuplicateVersion);
/// ```
pub struct MigrationRegistry<D> {
    inner: Arc<MigrationRegistryInner<D>>,
}

impl<D> MigrationRegistry<D> {
    pub fn new() -> Self {
        MigrationRegistry {
            inner: Arc::new(MigrationRegistryInner {
                migrations: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// Registers a migration for `version`.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::DuplicateVersion] when `version` is already
    /// registered; the existing registration is left untouched.
    pub fn register<F, B>(&self, version: i64, forward: F, backward: B) -> MigrateResult<()>
    where
        F: Fn(&D) -> MigrateResult<()> + Send + Sync + 'static,
        B: Fn(&D) -> MigrateResult<()> + Send + Sync + 'static,
    {
        self.register_migration(Migration::new(version, forward, backward))
    }

    /// Registers a prebuilt migration, with the same rules as [Self::register].
    pub fn register_migration(&self, migration: Migration<D>) -> MigrateResult<()> {
        self.inner.register(migration)
    }

    /// Removes the migration for `version`. Removing an unknown version is a
    /// no-op.
    pub fn unregister(&self, version: i64) {
        self.inner.migrations.write().remove(&version);
    }

    /// All registered versions, ascending, or descending when `reverse` is set.
    pub fn versions(&self, reverse: bool) -> Vec<i64> {
        let migrations = self.inner.migrations.read();
        if reverse {
            migrations.keys().rev().copied().collect()
        } else {
            migrations.keys().copied().collect()
        }
    }

    pub fn get(&self, version: i64) -> Option<Migration<D>> {
        self.inner.migrations.read().get(&version).cloned()
    }

    pub fn contains(&self, version: i64) -> bool {
        self.inner.migrations.read().contains_key(&version)
    }

    pub fn len(&self) -> usize {
        self.inner.migrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.migrations.read().is_empty()
    }

    /// Ascending copy of every registered migration, taken under one read lock.
    pub fn snapshot(&self) -> Vec<Migration<D>> {
        self.inner.migrations.read().values().cloned().collect()
    }
}

impl<D> Clone for MigrationRegistry<D> {
    fn clone(&self) -> Self {
        MigrationRegistry {
            inner: self.inner.clone(),
        }
    }
}

impl<D> Default for MigrationRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

struct MigrationRegistryInner<D> {
    migrations: RwLock<BTreeMap<i64, Migration<D>>>,
}

impl<D> MigrationRegistryInner<D> {
    fn register(&self, migration: Migration<D>) -> MigrateResult<()> {
        let mut migrations = self.migrations.write();
        let version = migration.version();
        if migrations.contains_key(&version) {
            log::debug!("Migration version {} is already registered", version);
            return Err(MigrateError::new(
                &format!("Migration version {} is already registered", version),
                ErrorKind::DuplicateVersion,
            ));
        }

        migrations.insert(version, migration);
        log::debug!("Registered migration version {}", version);
        Ok(())
    }
}
