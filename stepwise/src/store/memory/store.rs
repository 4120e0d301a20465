use super::InMemoryCollection;
use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use crate::store::{DocumentCollection, DocumentStore, DocumentStoreProvider};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory implementation of a document store.
///
/// # Characteristics
/// - **Thread-Safe**: collections are concurrent skip lists, the catalog a concurrent map
/// - **No Persistence**: all data is lost when the last handle is dropped
/// - **Closable**: after `close()` every store and collection call fails
///
/// # Usage
/// ```rust
/// use stepwise::store::memory::InMemoryStore;
/// use stepwise::store::{DocumentStoreProvider, OperationContext};
/// use stepwise::doc;
///
/// let store = InMemoryStore::new();
/// let markers = store.collection("migrations").unwrap();
/// markers.insert_one(&OperationContext::unbounded(), doc! { "version": 1i64 }).unwrap();
/// assert_eq!(markers.size().unwrap(), 1);
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new()),
        }
    }

    /// Wraps this store into a [DocumentStore] handle sharing the same data.
    pub fn as_document_store(&self) -> DocumentStore {
        DocumentStore::new(self.clone())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore::new()
    }
}

impl DocumentStoreProvider for InMemoryStore {
    fn collection(&self, name: &str) -> MigrateResult<DocumentCollection> {
        self.inner.collection(name)
    }

    fn has_collection(&self, name: &str) -> MigrateResult<bool> {
        self.inner.has_collection(name)
    }

    fn commit(&self) -> MigrateResult<()> {
        self.inner.check_opened()
    }

    fn close(&self) -> MigrateResult<()> {
        self.inner.close()
    }

    fn is_closed(&self) -> MigrateResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }
}

struct InMemoryStoreInner {
    collections: DashMap<String, InMemoryCollection>,
    closed: Arc<AtomicBool>,
}

impl InMemoryStoreInner {
    fn new() -> Self {
        InMemoryStoreInner {
            collections: DashMap::new(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn check_opened(&self) -> MigrateResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("In-memory store is already closed");
            return Err(MigrateError::new(
                "In-memory store is already closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> MigrateResult<DocumentCollection> {
        self.check_opened()?;
        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(MigrateError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }

        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| InMemoryCollection::new(name, self.closed.clone()))
            .clone();
        Ok(DocumentCollection::new(collection))
    }

    fn has_collection(&self, name: &str) -> MigrateResult<bool> {
        self.check_opened()?;
        Ok(self.collections.contains_key(name))
    }

    fn close(&self) -> MigrateResult<()> {
        self.closed.store(true, Ordering::Relaxed);
        self.collections.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::store::OperationContext;

    #[test]
    fn collection_is_created_on_demand() {
        let store = InMemoryStore::new();
        assert!(!store.has_collection("migrations").unwrap());
        store.collection("migrations").unwrap();
        assert!(store.has_collection("migrations").unwrap());
    }

    #[test]
    fn same_name_returns_shared_collection() {
        let store = InMemoryStore::new();
        let ctx = OperationContext::unbounded();
        let first = store.collection("migrations").unwrap();
        first.insert_one(&ctx, doc! { "version": 1i64 }).unwrap();

        let second = store.collection("migrations").unwrap();
        assert_eq!(second.size().unwrap(), 1);
    }

    #[test]
    fn collections_are_isolated_by_name() {
        let store = InMemoryStore::new();
        let ctx = OperationContext::unbounded();
        store
            .collection("migrations")
            .unwrap()
            .insert_one(&ctx, doc! { "version": 1i64 })
            .unwrap();
        assert_eq!(store.collection("changes").unwrap().size().unwrap(), 0);
    }

    #[test]
    fn empty_collection_name_is_rejected() {
        let store = InMemoryStore::new();
        let err = store.collection("").err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn closed_store_rejects_calls() {
        let store = InMemoryStore::new();
        let collection = store.collection("migrations").unwrap();
        store.close().unwrap();

        assert!(store.is_closed().unwrap());
        assert_eq!(
            store.collection("migrations").err().unwrap().kind(),
            &ErrorKind::StoreAlreadyClosed
        );
        assert_eq!(store.commit().unwrap_err().kind(), &ErrorKind::StoreAlreadyClosed);

        let err = collection
            .insert_one(&OperationContext::unbounded(), doc! { "version": 1i64 })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
    }

    #[test]
    fn document_store_handle_shares_data() {
        let store = InMemoryStore::new();
        let handle = store.as_document_store();
        handle
            .collection("migrations")
            .unwrap()
            .insert_one(&OperationContext::unbounded(), doc! { "version": 3i64 })
            .unwrap();
        assert_eq!(store.collection("migrations").unwrap().size().unwrap(), 1);
    }
}
