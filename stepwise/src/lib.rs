//! # Stepwise - versioned schema migrations for document stores
//!
//! Stepwise keeps track of which versioned change-sets have been applied to a
//! database and applies or reverts them in order. Applied versions are
//! recorded as marker documents in a dedicated collection of a pluggable
//! document store.
//!
//! ## Key Features
//!
//! - **Explicit registry**: migrations live in a [`migration::MigrationRegistry`]
//!   owned by the caller, safe to fill from several threads
//! - **Ordered runs**: `up` applies pending versions ascending, `down` reverts
//!   applied versions, each step persisted right after it succeeds
//! - **Stop on first failure**: a failed step ends the run and leaves the
//!   marker consistent with what actually ran
//! - **Per call deadlines**: every storage call is bounded by the configured
//!   timeout
//! - **Pluggable storage**: an in-memory store ships with the crate, a
//!   persistent fjall store with `stepwise-fjall-adapter`
//!
//! ## Quick Start
//!
//! ```rust
//! use stepwise::migration::MigrationRegistry;
//! use stepwise::migrator::Migrator;
//! use stepwise::store::memory::InMemoryStore;
//! use parking_lot::Mutex;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry: MigrationRegistry<Mutex<Vec<String>>> = MigrationRegistry::new();
//! registry.register(
//!     1,
//!     |db| {
//!         db.lock().push("create users".to_string());
//!         Ok(())
//!     },
//!     |db| {
//!         db.lock().pop();
//!         Ok(())
//!     },
//! )?;
//!
//! let migrator = Migrator::builder()
//!     .registry(registry)
//!     .store(InMemoryStore::new().as_document_store())
//!     .database(Mutex::new(Vec::new()))
//!     .timeout("2s")
//!     .open()?;
//!
//! migrator.up()?;
//! assert_eq!(migrator.version()?, 1);
//!
//! migrator.down()?;
//! assert_eq!(migrator.version()?, 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents and record ids exchanged with stores
//! - [`common`] - Values, sort orders, constants and utilities
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Filters used to select marker documents
//! - [`migration`] - Migrations, the registry and the version store
//! - [`migrator`] - The migration runner
//! - [`migrator_builder`] - Builder for the runner
//! - [`migrator_config`] - Options and resolved configuration
//! - [`store`] - Storage adapter contract and the in-memory store

use crate::collection::snowflake::SnowflakeIdGenerator;
use std::sync::LazyLock;

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod migration;
pub mod migrator;
pub mod migrator_builder;
pub mod migrator_config;
pub mod store;

pub use common::Value;
pub use errors::{ErrorKind, MigrateError, MigrateResult};
pub use migration::{Migration, MigrationRegistry};
pub use migrator::Migrator;

pub(crate) static ID_GENERATOR: LazyLock<SnowflakeIdGenerator> =
    LazyLock::new(SnowflakeIdGenerator::new);
