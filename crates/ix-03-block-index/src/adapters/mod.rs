//! # Adapters Layer
//!
//! `KeyValueStore` implementations shipped with the crate. The RocksDB
//! adapter lives in `indexer-runtime` behind the `rocksdb` feature.

pub mod storage;

pub use storage::{FaultInjectingKVStore, FaultSwitch, FileBackedKVStore, InMemoryKVStore};
