use crate::collection::{Document, RecordId};
use crate::common::SortSpec;
use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use crate::filter::Filter;
use crate::store::{select_first, DocumentCollectionProvider, OperationContext};
use crossbeam_skiplist::SkipMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory document collection backed by a concurrent skip list.
///
/// Documents are keyed by their [RecordId]; since ids grow monotonically,
/// key order is insertion order.
#[derive(Clone)]
pub struct InMemoryCollection {
    inner: Arc<InMemoryCollectionInner>,
}

impl InMemoryCollection {
    pub(crate) fn new(name: &str, store_closed: Arc<AtomicBool>) -> Self {
        InMemoryCollection {
            inner: Arc::new(InMemoryCollectionInner {
                name: name.to_string(),
                documents: SkipMap::new(),
                store_closed,
            }),
        }
    }
}

impl DocumentCollectionProvider for InMemoryCollection {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn find_one(
        &self,
        ctx: &OperationContext,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> MigrateResult<Option<Document>> {
        self.inner.find_one(ctx, filter, sort)
    }

    fn insert_one(&self, ctx: &OperationContext, document: Document) -> MigrateResult<RecordId> {
        self.inner.insert_one(ctx, document)
    }

    fn delete_one(&self, ctx: &OperationContext, filter: &Filter) -> MigrateResult<u64> {
        self.inner.delete_one(ctx, filter)
    }

    fn size(&self) -> MigrateResult<u64> {
        self.inner.check_opened()?;
        Ok(self.inner.documents.len() as u64)
    }
}

struct InMemoryCollectionInner {
    name: String,
    documents: SkipMap<RecordId, Document>,
    store_closed: Arc<AtomicBool>,
}

impl InMemoryCollectionInner {
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

    fn find_one(
        &self,
        ctx: &OperationContext,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> MigrateResult<Option<Document>> {
        self.check_opened()?;
        ctx.check("find_one")?;

        let candidates = self.documents.iter().map(|entry| entry.value().clone());
        Ok(select_first(candidates, filter, sort))
    }

    fn insert_one(&self, ctx: &OperationContext, mut document: Document) -> MigrateResult<RecordId> {
        self.check_opened()?;
        ctx.check("insert_one")?;

        let id = RecordId::new();
        document.set_id(id);
        self.documents.insert(id, document);
        Ok(id)
    }

    fn delete_one(&self, ctx: &OperationContext, filter: &Filter) -> MigrateResult<u64> {
        self.check_opened()?;
        ctx.check("delete_one")?;

        let target = self
            .documents
            .iter()
            .find(|entry| filter.apply(entry.value()))
            .map(|entry| *entry.key());

        match target {
            Some(id) => Ok(self.documents.remove(&id).map_or(0, |_| 1)),
            None => Ok(0),
        }
    }
}
