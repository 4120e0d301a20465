use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use crate::migration::{Migration, MigrationRegistry, Versioner};
use crate::migrator_builder::MigratorBuilder;
use crate::migrator_config::MigratorConfig;
use crate::store::OperationContext;
use std::sync::Arc;
use std::time::Duration;

/// Applies and reverts registered migrations against a database handle.
///
/// A run reads the current version once, then walks the registry snapshot in
/// ascending order:
///
/// - [Migrator::up] runs the forward function of every version greater than
///   the current one and writes a marker after each success
/// - [Migrator::down] runs the backward function of every version less than
///   or equal to the current one and deletes its marker after each success
///
/// The first failure stops the run. Steps completed before it stay applied
/// and their markers stay written. Each storage call gets its own deadline
/// derived from the configured timeout.
///
/// The migrator holds no lock of its own; concurrent runs against the same
/// marker collection are not coordinated.
///
/// # Examples
///
/// ```rust
/// use stepwise::migration::MigrationRegistry;
/// use stepwise::migrator::Migrator;
/// use stepwise::store::memory::InMemoryStore;
/// use parking_lot::Mutex;
///
/// let registry: MigrationRegistry<Mutex<Vec<String>>> = MigrationRegistry::new();
/// registry
///     .register(
///         1,
///         |db| {
///             db.lock().push("users".to_string());
///             Ok(())
///         },
///         |db| {
///             db.lock().retain(|c| c != "users");
///             Ok(())
///         },
///     )
///     .unwrap();
///
/// let migrator = Migrator::builder()
///     .registry(registry)
///     .store(InMemoryStore::new().as_document_store())
///     .database(Mutex::new(Vec::new()))
///     .open()
///     .unwrap();
///
/// migrator.up().unwrap();
/// assert_eq!(migrator.version().unwrap(), 1);
/// assert_eq!(*migrator.database().lock(), vec!["users".to_string()]);
/// ```
pub struct Migrator<D> {
    inner: Arc<MigratorInner<D>>,
}

impl<D: 'static> Migrator<D> {
    /// Creates a [MigratorBuilder].
    pub fn builder() -> MigratorBuilder<D> {
        MigratorBuilder::new()
    }

    /// Assembles a migrator from already resolved parts.
    pub fn new(
        config: MigratorConfig,
        registry: MigrationRegistry<D>,
        versioner: Arc<dyn Versioner<D>>,
        database: D,
    ) -> Self {
        Migrator {
            inner: Arc::new(MigratorInner {
                config,
                registry,
                versioner,
                database,
            }),
        }
    }

    /// Current applied version, `0` when nothing has been applied.
    pub fn version(&self) -> MigrateResult<i64> {
        self.inner.read_version()
    }

    /// Applies every registered migration above the current version.
    pub fn up(&self) -> MigrateResult<()> {
        self.inner.up()
    }

    /// Reverts every registered migration at or below the current version.
    pub fn down(&self) -> MigrateResult<()> {
        self.inner.down()
    }

    /// Name of the marker collection.
    pub fn schema(&self) -> &str {
        self.inner.config.schema()
    }

    /// Deadline given to each storage call.
    pub fn timeout(&self) -> Duration {
        self.inner.config.timeout()
    }

    pub fn registry(&self) -> &MigrationRegistry<D> {
        &self.inner.registry
    }

    pub fn database(&self) -> &D {
        &self.inner.database
    }
}

impl<D> std::fmt::Debug for Migrator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("schema", &self.inner.config.schema())
            .field("timeout", &self.inner.config.timeout())
            .field("versions", &self.inner.registry.versions(false))
            .finish()
    }
}

impl<D> Clone for Migrator<D> {
    fn clone(&self) -> Self {
        Migrator {
            inner: self.inner.clone(),
        }
    }
}

struct MigratorInner<D> {
    config: MigratorConfig,
    registry: MigrationRegistry<D>,
    versioner: Arc<dyn Versioner<D>>,
    database: D,
}

impl<D> MigratorInner<D> {
    fn context(&self) -> OperationContext {
        OperationContext::with_timeout(self.config.timeout())
    }

    fn read_version(&self) -> MigrateResult<i64> {
        self.versioner.read_version(&self.context())
    }

    fn up(&self) -> MigrateResult<()> {
        let current = self.read_version()?;
        let mut applied = 0usize;

        for migration in self.registry.snapshot() {
            if migration.version() <= current {
                continue;
            }

            migration
                .apply(&self.database)
                .map_err(|err| step_failed("forward", &migration, err))?;
            self.versioner.write_version(&self.context(), &migration)?;

            log::debug!("Applied migration version {}", migration.version());
            applied += 1;
        }

        log::info!(
            "Applied {} migration(s) on {} starting from version {}",
            applied,
            self.config.schema(),
            current
        );
        Ok(())
    }

    fn down(&self) -> MigrateResult<()> {
        let current = self.read_version()?;
        let mut reverted = 0usize;

        for migration in self.registry.snapshot() {
            if migration.version() > current {
                continue;
            }

            migration
                .revert(&self.database)
                .map_err(|err| step_failed("backward", &migration, err))?;
            self.versioner.delete_version(&self.context(), &migration)?;

            log::debug!("Reverted migration version {}", migration.version());
            reverted += 1;
        }

        log::info!(
            "Reverted {} migration(s) on {} starting from version {}",
            reverted,
            self.config.schema(),
            current
        );
        Ok(())
    }
}

fn step_failed<D>(direction: &str, migration: &Migration<D>, cause: MigrateError) -> MigrateError {
    log::debug!(
        "The {} migration of version {} failed: {}",
        direction,
        migration.version(),
        cause
    );
    MigrateError::new_with_cause(
        &format!(
            "The {} migration of version {} failed: {}",
            direction,
            migration.version(),
            cause
        ),
        ErrorKind::MigrationFunctionError,
        cause,
    )
}
