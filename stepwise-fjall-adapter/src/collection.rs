use crate::codec::{decode_document, decode_key, encode_document, encode_key, to_migrate_error};
use fjall::PartitionHandle;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stepwise::collection::{Document, RecordId};
use stepwise::common::{SortSpec, DOC_ID};
use stepwise::errors::{ErrorKind, MigrateError, MigrateResult};
use stepwise::filter::Filter;
use stepwise::store::{select_first, DocumentCollectionProvider, OperationContext};

/// Marker collection stored in one fjall partition.
///
/// Keys are big-endian record ids, values bincode-encoded documents. Writes
/// go through a per-collection lock so `delete_one` removes exactly one match
/// even with concurrent callers.
#[derive(Clone)]
pub struct FjallCollection {
    inner: Arc<FjallCollectionInner>,
}

impl FjallCollection {
    pub(crate) fn new(name: &str, partition: PartitionHandle, store_closed: Arc<AtomicBool>) -> Self {
        FjallCollection {
            inner: Arc::new(FjallCollectionInner {
                name: name.to_string(),
                partition,
                store_closed,
                write_lock: Mutex::new(()),
            }),
        }
    }
}

impl DocumentCollectionProvider for FjallCollection {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn find_one(
        &self,
        ctx: &OperationContext,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> MigrateResult<Option<Document>> {
        self.inner.check_opened()?;
        ctx.check("find_one")?;

        let documents = self.inner.scan()?;
        Ok(select_first(documents.into_iter().map(|(_, doc)| doc), filter, sort))
    }

    fn insert_one(&self, ctx: &OperationContext, document: Document) -> MigrateResult<RecordId> {
        self.inner.check_opened()?;
        ctx.check("insert_one")?;

        let _guard = self.inner.write_lock.lock();
        self.inner.insert(document)
    }

    fn delete_one(&self, ctx: &OperationContext, filter: &Filter) -> MigrateResult<u64> {
        self.inner.check_opened()?;
        ctx.check("delete_one")?;

        let _guard = self.inner.write_lock.lock();
        let target = self
            .inner
            .scan()?
            .into_iter()
            .find(|(_, doc)| filter.apply(doc))
            .map(|(id, _)| id);

        match target {
            Some(id) => {
                self.inner.remove(&id)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn size(&self) -> MigrateResult<u64> {
        self.inner.check_opened()?;
        match self.inner.partition.len() {
            Ok(len) => Ok(len as u64),
            Err(err) => {
                log::error!("Failed to count documents in {}: {}", self.inner.name, err);
                Err(to_migrate_error(err))
            }
        }
    }
}

struct FjallCollectionInner {
    name: String,
    partition: PartitionHandle,
    store_closed: Arc<AtomicBool>,
    write_lock: Mutex<()>,
}

impl FjallCollectionInner {
    fn check_opened(&self) -> MigrateResult<()> {
        if self.store_closed.load(Ordering::Relaxed) {
            log::error!("Collection {} belongs to a closed store", self.name);
            return Err(MigrateError::new(
                &format!("Collection {} belongs to a closed store", self.name),
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    /// Every document with its id, in key order.
    fn scan(&self) -> MigrateResult<Vec<(RecordId, Document)>> {
        let mut documents = Vec::new();
        for entry in self.partition.iter() {
            let (key, value) = entry.map_err(|err| {
                log::error!("Failed to read from {}: {}", self.name, err);
                to_migrate_error(err)
            })?;
            documents.push((decode_key(&key)?, decode_document(&value)?));
        }
        Ok(documents)
    }

    fn insert(&self, mut document: Document) -> MigrateResult<RecordId> {
        let id = RecordId::new();
        document.put(DOC_ID, id)?;
        let bytes = encode_document(&document)?;

        if let Err(err) = self.partition.insert(encode_key(&id), bytes) {
            log::error!("Failed to insert into {}: {}", self.name, err);
            return Err(to_migrate_error(err));
        }
        Ok(id)
    }

    fn remove(&self, id: &RecordId) -> MigrateResult<()> {
        if let Err(err) = self.partition.remove(encode_key(id)) {
            log::error!("Failed to remove {} from {}: {}", id, self.name, err);
            return Err(to_migrate_error(err));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{cleanup, random_path};
    use crate::FjallStore;
    use std::time::Duration;
    use stepwise::common::{order_by, SortOrder};
    use stepwise::doc;
    use stepwise::errors::ErrorKind;
    use stepwise::filter::{all, field};
    use stepwise::store::{DocumentStoreProvider, OperationContext};

    #[test]
    fn insert_find_and_delete() {
        let path = random_path();
        let store = FjallStore::builder().db_path(&path).open().unwrap();
        let markers = store.collection("migrations").unwrap();
        let ctx = OperationContext::unbounded();

        for version in [1i64, 3, 2] {
            markers.insert_one(&ctx, doc! { "version": version }).unwrap();
        }
        assert_eq!(markers.size().unwrap(), 3);

        let sort = order_by("version", SortOrder::Descending);
        let latest = markers.find_one(&ctx, &all(), Some(&sort)).unwrap().unwrap();
        assert_eq!(latest.get("version").as_i64(), Some(3));
        assert!(latest.id().is_some());

        assert_eq!(markers.delete_one(&ctx, &field("version").eq(3i64)).unwrap(), 1);
        assert_eq!(markers.delete_one(&ctx, &field("version").eq(3i64)).unwrap(), 0);
        let latest = markers.find_one(&ctx, &all(), Some(&sort)).unwrap().unwrap();
        assert_eq!(latest.get("version").as_i64(), Some(2));

        store.close().unwrap();
        drop(markers);
        drop(store);
        cleanup(&path);
    }

    #[test]
    fn first_match_is_earliest_inserted() {
        let path = random_path();
        let store = FjallStore::builder().db_path(&path).open().unwrap();
        let markers = store.collection("migrations").unwrap();
        let ctx = OperationContext::unbounded();

        markers.insert_one(&ctx, doc! { "version": 5i64, "run": "a" }).unwrap();
        markers.insert_one(&ctx, doc! { "version": 5i64, "run": "b" }).unwrap();

        let found = markers.find_one(&ctx, &field("version").eq(5i64), None).unwrap().unwrap();
        assert_eq!(found.get("run").as_str(), Some("a"));

        markers.delete_one(&ctx, &field("version").eq(5i64)).unwrap();
        let found = markers.find_one(&ctx, &all(), None).unwrap().unwrap();
        assert_eq!(found.get("run").as_str(), Some("b"));

        store.close().unwrap();
        drop(markers);
        drop(store);
        cleanup(&path);
    }

    #[test]
    fn expired_context_is_rejected() {
        let path = random_path();
        let store = FjallStore::builder().db_path(&path).open().unwrap();
        let markers = store.collection("migrations").unwrap();
        let expired = OperationContext::with_timeout(Duration::ZERO);

        let err = markers.insert_one(&expired, doc! { "version": 1i64 }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Timeout);
        assert_eq!(markers.size().unwrap(), 0);

        store.close().unwrap();
        drop(markers);
        drop(store);
        cleanup(&path);
    }

    #[test]
    fn closed_store_rejects_collection_calls() {
        let path = random_path();
        let store = FjallStore::builder().db_path(&path).open().unwrap();
        let markers = store.collection("migrations").unwrap();
        store.close().unwrap();

        let err = markers
            .find_one(&OperationContext::unbounded(), &all(), None)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
        assert_eq!(markers.size().unwrap_err().kind(), &ErrorKind::StoreAlreadyClosed);

        drop(markers);
        drop(store);
        cleanup(&path);
    }
}
