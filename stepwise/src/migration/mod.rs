//! Versioned migrations and their bookkeeping.
//!
//! - [Migration]: a version number bound to a forward and a backward function
//! - [MigrationRegistry]: the catalog of known migrations, ordered by version
//! - [Versioner] / [VersionStore]: persistence of applied-version markers
//!
//! # Example
//!
//! ```rust
//! use stepwise::migration::MigrationRegistry;
//!
//! struct Db;
//!
//! let registry: MigrationRegistry<Db> = MigrationRegistry::new();
//! registry.register(1, |_db| Ok(()), |_db| Ok(())).unwrap();
//! registry.register(2, |_db| Ok(()), |_db| Ok(())).unwrap();
//! assert_eq!(registry.versions(false), vec![1, 2]);
//! assert!(registry.register(2, |_db| Ok(()), |_db| Ok(())).is_err());
//! ```

mod migration;
mod registry;
mod version;

pub use migration::*;
pub use registry::*;
pub use version::*;
