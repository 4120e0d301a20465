use crate::collection::{Document, RecordId};
use crate::common::SortSpec;
use crate::errors::MigrateResult;
use crate::filter::Filter;
use crate::store::OperationContext;
use std::ops::Deref;
use std::sync::Arc;

/// Narrow contract for one named document collection.
///
/// This is the whole surface the version store needs from a storage engine.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; individual operations are expected to
/// be serialized by the engine itself.
pub trait DocumentCollectionProvider: Send + Sync {
    /// Name of the collection.
    fn name(&self) -> String;

    /// Returns the first document matching `filter`.
    ///
    /// When `sort` is given, the document ranked first by that sort is
    /// returned; ties are resolved in favour of the earliest inserted
    /// document. Returns `Ok(None)` when nothing matches.
    fn find_one(
        &self,
        ctx: &OperationContext,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> MigrateResult<Option<Document>>;

    /// Inserts `document`, assigning it a fresh [RecordId] stored in `_id`.
    fn insert_one(&self, ctx: &OperationContext, document: Document) -> MigrateResult<RecordId>;

    /// Deletes at most one document matching `filter`, the earliest inserted
    /// one. Returns the number of deleted documents (0 or 1).
    fn delete_one(&self, ctx: &OperationContext, filter: &Filter) -> MigrateResult<u64>;

    /// Number of documents currently stored.
    fn size(&self) -> MigrateResult<u64>;
}

/// Cheaply clonable handle to a [DocumentCollectionProvider].
#[derive(Clone)]
pub struct DocumentCollection {
    inner: Arc<dyn DocumentCollectionProvider>,
}

impl DocumentCollection {
    pub fn new<T: DocumentCollectionProvider + 'static>(inner: T) -> Self {
        DocumentCollection {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentCollection {
    type Target = Arc<dyn DocumentCollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Selects the document `find_one` must return from candidates given in
/// insertion order.
///
/// Shared by the adapters so every engine resolves sort ties the same way.
pub fn select_first<I>(documents: I, filter: &Filter, sort: Option<&SortSpec>) -> Option<Document>
where
    I: IntoIterator<Item = Document>,
{
    let mut matches = documents.into_iter().filter(|doc| filter.apply(doc));
    let sort = match sort {
        Some(sort) => sort,
        None => return matches.next(),
    };

    let mut best: Option<Document> = None;
    for candidate in matches {
        let replace = match &best {
            None => true,
            Some(current) => {
                let ordering = candidate.get(sort.field()).cmp(&current.get(sort.field()));
                sort.order().apply(ordering) == std::cmp::Ordering::Less
            }
        };
        if replace {
            best = Some(candidate);
        }
    }
    best
}
