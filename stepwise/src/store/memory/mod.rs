mod collection;
mod store;

pub use collection::*;
pub use store::*;
