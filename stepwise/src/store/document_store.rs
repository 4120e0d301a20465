use crate::errors::MigrateResult;
use crate::store::DocumentCollection;
use std::ops::Deref;
use std::sync::Arc;

/// Storage engine entry point: hands out named collections.
///
/// # Implementations
/// - `InMemoryStore`: in-memory storage for testing/temporary use
/// - `FjallStore`: persistent storage using the Fjall backend
pub trait DocumentStoreProvider: Send + Sync {
    /// Opens the collection `name`, creating it when it does not exist.
    fn collection(&self, name: &str) -> MigrateResult<DocumentCollection>;

    /// Checks whether a collection with the given name exists.
    fn has_collection(&self, name: &str) -> MigrateResult<bool>;

    /// Flushes pending writes. A no-op for in-memory stores.
    fn commit(&self) -> MigrateResult<()>;

    /// Closes the store; later calls on it or its collections fail with
    /// `ErrorKind::StoreAlreadyClosed`.
    fn close(&self) -> MigrateResult<()>;

    fn is_closed(&self) -> MigrateResult<bool>;
}

/// Cheaply clonable handle to a [DocumentStoreProvider].
///
/// Cloning only increments the reference count, so the same store can be
/// shared by several migrators and threads.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
