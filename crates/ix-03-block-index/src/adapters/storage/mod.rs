//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

mod fault;
mod file;
mod memory;

pub use fault::{FaultInjectingKVStore, FaultSwitch};
pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
