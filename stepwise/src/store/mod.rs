//! Storage adapter boundary.
//!
//! The version store only needs three operations on one named collection:
//! find-one (with a sort), insert-one and delete-one. Those are captured by
//! [DocumentCollectionProvider]; [DocumentStoreProvider] opens collections by
//! name. Any engine that can offer these operations can persist migration
//! markers.
//!
//! # Implementations
//!
//! - [memory::InMemoryStore]: concurrent in-memory store for tests and
//!   ephemeral runs
//! - `stepwise-fjall-adapter`: persistent, LSM-based storage
//!
//! # Deadlines
//!
//! Every collection call receives an [OperationContext]. Implementations call
//! [OperationContext::check] before touching storage and must not block past
//! the context deadline.

mod context;
mod document_collection;
mod document_store;
pub mod memory;

pub use context::*;
pub use document_collection::*;
pub use document_store::*;
