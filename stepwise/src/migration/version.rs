use super::Migration;
use crate::collection::Document;
use crate::common::{now_utc, order_by, SortOrder, INITIAL_VERSION, TIMESTAMP_FIELD, VERSION_FIELD};
use crate::errors::{ErrorKind, MigrateError, MigrateResult};
use crate::filter::{all, field};
use crate::store::{DocumentCollection, OperationContext};

/// Durable record of applied migration versions.
///
/// The runner talks to the marker collection only through this trait, so it
/// can be driven by any implementation, including test fakes.
pub trait Versioner<D>: Send + Sync {
    /// Current version: the greatest version among stored markers, or `0`
    /// when no marker exists.
    fn read_version(&self, ctx: &OperationContext) -> MigrateResult<i64>;

    /// Records `migration` as applied.
    fn write_version(&self, ctx: &OperationContext, migration: &Migration<D>) -> MigrateResult<()>;

    /// Removes one marker of `migration`.
    fn delete_version(&self, ctx: &OperationContext, migration: &Migration<D>) -> MigrateResult<()>;
}

/// [Versioner] backed by a document collection.
///
/// Each applied migration leaves a marker document
/// `{ _id, version, timestamp }`. Markers are only ever inserted or deleted,
/// never updated in place.
#[derive(Clone)]
pub struct VersionStore {
    collection: DocumentCollection,
}

impl VersionStore {
    pub fn new(collection: DocumentCollection) -> Self {
        VersionStore { collection }
    }

    pub fn collection(&self) -> &DocumentCollection {
        &self.collection
    }

    fn decode_version(marker: &Document) -> MigrateResult<i64> {
        match marker.get(VERSION_FIELD).as_i64() {
            Some(version) => Ok(version),
            None => {
                log::error!("Marker {} has no integer version field", marker);
                Err(MigrateError::new(
                    &format!("Marker {} has no integer version field", marker),
                    ErrorKind::EncodingError,
                ))
            }
        }
    }
}

impl<D> Versioner<D> for VersionStore {
    fn read_version(&self, ctx: &OperationContext) -> MigrateResult<i64> {
        let sort = order_by(VERSION_FIELD, SortOrder::Descending);
        let latest = self.collection.find_one(ctx, &all(), Some(&sort))?;
        let version = match latest {
            Some(marker) => Self::decode_version(&marker)?,
            None => INITIAL_VERSION,
        };

        log::debug!("Read version {} from {}", version, self.collection.name());
        Ok(version)
    }

    fn write_version(&self, ctx: &OperationContext, migration: &Migration<D>) -> MigrateResult<()> {
        let mut marker = Document::new();
        marker.put(VERSION_FIELD, migration.version())?;
        marker.put(TIMESTAMP_FIELD, now_utc())?;

        let id = self.collection.insert_one(ctx, marker)?;
        log::debug!(
            "Wrote marker {} for version {} to {}",
            id,
            migration.version(),
            self.collection.name()
        );
        Ok(())
    }

    fn delete_version(&self, ctx: &OperationContext, migration: &Migration<D>) -> MigrateResult<()> {
        let filter = field(VERSION_FIELD).eq(migration.version());
        let deleted = self.collection.delete_one(ctx, &filter)?;
        log::debug!(
            "Deleted {} marker(s) for version {} from {}",
            deleted,
            migration.version(),
            self.collection.name()
        );
        Ok(())
    }
}
