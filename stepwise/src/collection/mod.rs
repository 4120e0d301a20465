//! Documents and record identities exchanged with storage adapters.

mod document;
mod record_id;
pub(crate) mod snowflake;

pub use document::*;
pub use record_id::*;
