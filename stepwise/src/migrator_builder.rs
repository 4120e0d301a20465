use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use crate::migration::{MigrationRegistry, VersionStore, Versioner};
use crate::migrator::Migrator;
use crate::migrator_config::{resolve_timeout, MigratorConfig, MigratorOptions};
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;

/// Builder for a [Migrator].
///
/// Settings are validated as they are applied; the first error is kept and
/// returned by [MigratorBuilder::open], before any storage is touched.
///
/// A database handle and a store are required. Without an explicit registry
/// the migrator starts with an empty one, reachable through
/// [Migrator::registry].
///
/// ```rust
/// use stepwise::errors::ErrorKind;
/// use stepwise::migrator::Migrator;
/// use stepwise::store::memory::InMemoryStore;
/// use std::time::Duration;
///
/// let migrator = Migrator::<()>::builder()
///     .schema("schema_history")
///     .timeout("5s")
///     .store(InMemoryStore::new().as_document_store())
///     .database(())
///     .open()
///     .unwrap();
/// assert_eq!(migrator.schema(), "schema_history");
/// assert_eq!(migrator.timeout(), Duration::from_secs(5));
///
/// let err = Migrator::<()>::builder().database(()).open().unwrap_err();
/// assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
/// ```
pub struct MigratorBuilder<D> {
    error: Option<MigrateError>,
    config: MigratorConfig,
    registry: Option<MigrationRegistry<D>>,
    store: Option<DocumentStore>,
    versioner: Option<Arc<dyn Versioner<D>>>,
    database: Option<D>,
}

impl<D: 'static> MigratorBuilder<D> {
    pub fn new() -> Self {
        MigratorBuilder {
            error: None,
            config: MigratorConfig::default(),
            registry: None,
            store: None,
            versioner: None,
            database: None,
        }
    }

    /// Name of the marker collection; blank means `"migrations"`.
    pub fn schema(mut self, schema: &str) -> Self {
        self.config.set_schema(schema);
        self
    }

    /// Per storage call deadline, as a human-readable duration like `"2s"`.
    /// Blank means `"2s"`.
    pub fn timeout(mut self, timeout: &str) -> Self {
        if self.error.is_none() {
            match resolve_timeout(Some(timeout)) {
                Ok(duration) => self.config.set_timeout(duration),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    pub fn timeout_duration(mut self, timeout: Duration) -> Self {
        self.config.set_timeout(timeout);
        self
    }

    /// Applies every field set in `options`; unset fields fall back to the
    /// defaults.
    pub fn options(mut self, options: &MigratorOptions) -> Self {
        if self.error.is_none() {
            match MigratorConfig::from_options(options) {
                Ok(config) => self.config = config,
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    pub fn registry(mut self, registry: MigrationRegistry<D>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Store holding the marker collection.
    pub fn store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the collection-backed version store. When set, no store is
    /// needed.
    pub fn versioner<V: Versioner<D> + 'static>(mut self, versioner: V) -> Self {
        self.versioner = Some(Arc::new(versioner));
        self
    }

    /// Handle passed to every forward and backward function.
    pub fn database(mut self, database: D) -> Self {
        self.database = Some(database);
        self
    }

    /// Validates the settings and creates the migrator.
    ///
    /// # Errors
    ///
    /// * the first error recorded by a setter
    /// * [ErrorKind::InvalidConfiguration] without database, or without both
    ///   store and versioner
    /// * any error the store reports while opening the marker collection
    pub fn open(self) -> MigrateResult<Migrator<D>> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let database = match self.database {
            Some(database) => database,
            None => {
                log::error!("A database handle is required to open a migrator");
                return Err(MigrateError::new(
                    "A database handle is required to open a migrator",
                    ErrorKind::InvalidConfiguration,
                ));
            }
        };

        let versioner: Arc<dyn Versioner<D>> = match (self.versioner, self.store) {
            (Some(versioner), _) => versioner,
            (None, Some(store)) => {
                let collection = store.collection(self.config.schema())?;
                Arc::new(VersionStore::new(collection))
            }
            (None, None) => {
                log::error!("A store is required to open a migrator");
                return Err(MigrateError::new(
                    "A store is required to open a migrator",
                    ErrorKind::InvalidConfiguration,
                ));
            }
        };

        log::debug!(
            "Opened migrator on {} with timeout {:?}",
            self.config.schema(),
            self.config.timeout()
        );
        Ok(Migrator::new(
            self.config,
            self.registry.unwrap_or_default(),
            versioner,
            database,
        ))
    }
}

impl<D: 'static> Default for MigratorBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::DocumentStoreProvider;

    #[test]
    fn defaults() {
        let migrator = Migrator::<()>::builder()
            .store(InMemoryStore::new().as_document_store())
            .database(())
            .open()
            .unwrap();
        assert_eq!(migrator.schema(), "migrations");
        assert_eq!(migrator.timeout(), Duration::from_secs(2));
        assert!(migrator.registry().is_empty());
        assert_eq!(migrator.version().unwrap(), 0);
    }

    #[test]
    fn invalid_timeout_fails_before_touching_store() {
        let store = InMemoryStore::new();
        let err = Migrator::<()>::builder()
            .timeout("invalid")
            .store(store.as_document_store())
            .database(())
            .open()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidTimeout);
        assert!(!store.has_collection("migrations").unwrap());
    }

    #[test]
    fn first_error_wins() {
        let err = Migrator::<()>::builder()
            .timeout("invalid")
            .options(&MigratorOptions::new().with_timeout("later"))
            .database(())
            .open()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidTimeout);
        assert!(err.message().contains("invalid"));
    }

    #[test]
    fn blank_settings_fall_back_to_defaults() {
        let store = InMemoryStore::new();
        let migrator = Migrator::<()>::builder()
            .schema("")
            .timeout("  ")
            .store(store.as_document_store())
            .database(())
            .open()
            .unwrap();
        assert_eq!(migrator.schema(), "migrations");
        assert_eq!(migrator.timeout(), Duration::from_secs(2));
        assert!(store.has_collection("migrations").unwrap());
    }

    #[test]
    fn options_are_resolved() {
        let options = MigratorOptions::new().with_schema("history").with_timeout("1m");
        let store = InMemoryStore::new();
        let migrator = Migrator::<()>::builder()
            .options(&options)
            .store(store.as_document_store())
            .database(())
            .open()
            .unwrap();
        assert_eq!(migrator.schema(), "history");
        assert_eq!(migrator.timeout(), Duration::from_secs(60));
        assert!(store.has_collection("history").unwrap());
    }

    #[test]
    fn missing_database_is_rejected() {
        let err = Migrator::<()>::builder()
            .store(InMemoryStore::new().as_document_store())
            .open()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn missing_store_is_rejected() {
        let err = Migrator::<()>::builder().database(()).open().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn closed_store_fails_to_open() {
        let store = InMemoryStore::new();
        store.close().unwrap();
        let err = Migrator::<()>::builder()
            .store(store.as_document_store())
            .database(())
            .open()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
    }

    #[test]
    fn explicit_versioner_replaces_store() {
        let store = InMemoryStore::new();
        let collection = store.collection("elsewhere").unwrap();
        let migrator = Migrator::<()>::builder()
            .versioner(VersionStore::new(collection))
            .database(())
            .timeout_duration(Duration::from_millis(250))
            .open()
            .unwrap();
        assert_eq!(migrator.timeout(), Duration::from_millis(250));
        assert_eq!(migrator.version().unwrap(), 0);
    }

    #[test]
    fn shared_registry_is_used() {
        let registry: MigrationRegistry<()> = MigrationRegistry::new();
        registry.register(1, |_| Ok(()), |_| Ok(())).unwrap();
        let migrator = Migrator::builder()
            .registry(registry.clone())
            .store(InMemoryStore::new().as_document_store())
            .database(())
            .open()
            .unwrap();

        migrator.up().unwrap();
        assert_eq!(migrator.version().unwrap(), 1);
        registry.register(2, |_| Ok(()), |_| Ok(())).unwrap();
        assert!(migrator.registry().contains(2));
    }
}
