use crate::codec::to_migrate_error;
use crate::collection::FjallCollection;
use crate::config::FjallConfig;
use crate::builder::FjallStoreBuilder;
use dashmap::DashMap;
use fjall::{Keyspace, PersistMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stepwise::errors::{ErrorKind, MigrateError, MigrateResult};
use stepwise::store::{DocumentCollection, DocumentStore, DocumentStoreProvider};

/// Persistent document store backed by a fjall keyspace.
///
/// Each collection lives in its own partition of the keyspace. Writes are
/// journaled by fjall; [DocumentStoreProvider::commit] and, unless disabled,
/// [DocumentStoreProvider::close] persist the journal to disk.
///
/// ```rust,no_run
/// use stepwise::store::DocumentStoreProvider;
/// use stepwise_fjall_adapter::FjallStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FjallStore::builder().db_path("/var/lib/app/markers").open()?;
/// let markers = store.collection("migrations")?;
/// println!("{} markers", markers.size()?);
/// store.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FjallStore {
    inner: Arc<FjallStoreInner>,
}

impl FjallStore {
    pub fn builder() -> FjallStoreBuilder {
        FjallStoreBuilder::new()
    }

    /// Opens or creates the keyspace at `config.db_path()`.
    pub fn open(config: FjallConfig) -> MigrateResult<FjallStore> {
        Ok(FjallStore {
            inner: Arc::new(FjallStoreInner::open(config)?),
        })
    }

    pub fn config(&self) -> FjallConfig {
        self.inner.config.clone()
    }

    /// Wraps this store into a [DocumentStore] handle sharing the keyspace.
    pub fn as_document_store(&self) -> DocumentStore {
        DocumentStore::new(self.clone())
    }
}

impl DocumentStoreProvider for FjallStore {
    fn collection(&self, name: &str) -> MigrateResult<DocumentCollection> {
        self.inner.collection(name)
    }

    fn has_collection(&self, name: &str) -> MigrateResult<bool> {
        self.inner.check_opened()?;
        Ok(self.inner.keyspace.partition_exists(name))
    }

    fn commit(&self) -> MigrateResult<()> {
        self.inner.check_opened()?;
        self.inner.commit()
    }

    fn close(&self) -> MigrateResult<()> {
        self.inner.close()
    }

    fn is_closed(&self) -> MigrateResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }
}

struct FjallStoreInner {
    keyspace: Keyspace,
    config: FjallConfig,
    closed: Arc<AtomicBool>,
    collections: DashMap<String, FjallCollection>,
}

impl FjallStoreInner {
    fn open(config: FjallConfig) -> MigrateResult<FjallStoreInner> {
        if config.db_path().is_empty() {
            log::error!("Fjall store requires a database path");
            return Err(MigrateError::new(
                "Fjall store requires a database path",
                ErrorKind::InvalidConfiguration,
            ));
        }

        match Keyspace::open(config.keyspace_config()) {
            Ok(keyspace) => {
                log::debug!("Opened fjall keyspace at {}", config.db_path());
                Ok(FjallStoreInner {
                    keyspace,
                    config,
                    closed: Arc::new(AtomicBool::new(false)),
                    collections: DashMap::new(),
                })
            }
            Err(err) => {
                log::error!("Failed to open or create keyspace: {}", err);
                Err(to_migrate_error(err))
            }
        }
    }

    fn check_opened(&self) -> MigrateResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Fjall store is already closed");
            return Err(MigrateError::new(
                "Fjall store is already closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> MigrateResult<DocumentCollection> {
        self.check_opened()?;
        validate_partition_name(name)?;

        if let Some(collection) = self.collections.get(name) {
            return Ok(DocumentCollection::new(collection.clone()));
        }

        match self
            .keyspace
            .open_partition(name, self.config.partition_config())
        {
            Ok(partition) => {
                let collection = self
                    .collections
                    .entry(name.to_string())
                    .or_insert_with(|| FjallCollection::new(name, partition, self.closed.clone()))
                    .clone();
                Ok(DocumentCollection::new(collection))
            }
            Err(err) => {
                log::error!("Failed to open partition {}: {}", name, err);
                Err(to_migrate_error(err))
            }
        }
    }

    fn commit(&self) -> MigrateResult<()> {
        match self.keyspace.persist(PersistMode::SyncAll) {
            Ok(_) => Ok(()),
            Err(err) => {
                log::error!("Failed to commit keyspace: {}", err);
                Err(to_migrate_error(err))
            }
        }
    }

    fn close(&self) -> MigrateResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Ok(());
        }

        if self.config.commit_before_close() {
            self.commit()?;
        }
        self.closed.store(true, Ordering::Relaxed);
        self.collections.clear();
        log::debug!("Closed fjall keyspace at {}", self.config.db_path());
        Ok(())
    }
}

impl Drop for FjallStoreInner {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Relaxed) && self.config.commit_before_close() {
            // drop must not panic, log and move on
            if let Err(e) = self.commit() {
                log::error!("Failed to commit keyspace: {}", e);
            }
        }
    }
}

/// Partition names are limited to `a-zA-Z0-9_-.#$`.
fn validate_partition_name(name: &str) -> MigrateResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 255
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '#' | '$'));
    if !valid {
        log::error!("Invalid collection name {:?} for fjall store", name);
        return Err(MigrateError::new(
            &format!("Invalid collection name {:?} for fjall store", name),
            ErrorKind::InvalidConfiguration,
        ));
    }
    Ok(())
}
