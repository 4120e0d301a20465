//! Query filters for selecting marker documents.
//!
//! Filters are built with the fluent API and evaluated by storage adapters
//! against each candidate document:
//! - `all()` matches every document
//! - `field("version").eq(3)` equality
//!
//! ```rust
//! use stepwise::doc;
//! use stepwise::filter::{all, field};
//!
//! let marker = doc! { "version": 3i64 };
//! assert!(all().apply(&marker));
//! assert!(field("version").eq(3i64).apply(&marker));
//! assert!(!field("version").eq(4i64).apply(&marker));
//! ```

mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;
