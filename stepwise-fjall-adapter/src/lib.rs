//! Persistent storage for stepwise migration markers, backed by the fjall
//! LSM-tree engine.
//!
//! Each marker collection maps to one fjall partition. Documents are encoded
//! with bincode and keyed by their big-endian record id.
//!
//! ```rust,no_run
//! use stepwise::migration::MigrationRegistry;
//! use stepwise::migrator::Migrator;
//! use stepwise_fjall_adapter::FjallStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FjallStore::builder().db_path("/var/lib/app/markers").open()?;
//! let registry: MigrationRegistry<()> = MigrationRegistry::new();
//! registry.register(1, |_| Ok(()), |_| Ok(()))?;
//!
//! let migrator = Migrator::builder()
//!     .registry(registry)
//!     .store(store.as_document_store())
//!     .database(())
//!     .open()?;
//! migrator.up()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod codec;
mod collection;
mod config;
mod store;

pub use builder::*;
pub use codec::{FjallCodecError, FjallCodecResult};
pub use collection::*;
pub use config::*;
pub use store::*;
