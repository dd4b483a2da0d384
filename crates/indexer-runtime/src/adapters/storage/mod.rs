//! Storage backends for the block index.
//!
//! - `RocksDbStore` with the `rocksdb` feature
//! - `FileBackedKVStore` otherwise (`<database_directory>/index.kv`)
//! - `InMemoryKVStore` for `--in-memory` runs

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

use crate::container::IndexerSettings;
use ix_03_block_index::{InMemoryKVStore, KVStoreError, KeyValueStore};
use tracing::info;

/// File name of the file-backed store inside the database directory.
pub const INDEX_FILE_NAME: &str = "index.kv";

/// Open the configured store.
pub fn open_store(
    settings: &IndexerSettings,
    in_memory: bool,
) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
    if in_memory {
        info!("Using in-memory store, nothing will be persisted");
        return Ok(Box::new(InMemoryKVStore::new()));
    }

    open_persistent(settings)
}

#[cfg(feature = "rocksdb")]
fn open_persistent(settings: &IndexerSettings) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
    info!(path = %settings.database_directory.display(), "Opening RocksDB store");
    Ok(Box::new(RocksDbStore::open_default(
        &settings.database_directory,
    )?))
}

#[cfg(not(feature = "rocksdb"))]
fn open_persistent(settings: &IndexerSettings) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
    let path = settings.database_directory.join(INDEX_FILE_NAME);
    info!(path = %path.display(), "Opening file-backed store");
    Ok(Box::new(ix_03_block_index::FileBackedKVStore::open(path)?))
}
