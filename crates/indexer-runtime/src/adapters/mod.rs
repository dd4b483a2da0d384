//! Runtime adapters: storage backends and the read-side facade.

pub mod query;
pub mod storage;

pub use query::{Consistency, QueryFacade};
pub use storage::open_store;
