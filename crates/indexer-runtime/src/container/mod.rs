//! # Indexer Container
//!
//! Owns the two shared stores every stage works against:
//!
//! - `cache` - `HotCache`, written by the indexing handler only
//! - `index` - `BlockIndex`, written by the indexing handler only
//!
//! Both sit behind `Arc<RwLock<_>>` so the query facade can read while the
//! pipeline is running. Writers hold one lock at a time, never both.

pub mod config;

pub use config::{ConfigError, IndexerConfig, IndexerSettings, TestConfig};

use crate::adapters::QueryFacade;
use ix_02_hot_cache::{CacheConfig, HotCache};
use ix_03_block_index::{BlockIndex, IndexError, KeyValueStore};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handles to the hot cache and the block index.
pub struct IndexerContainer<KV: KeyValueStore> {
    pub cache: Arc<RwLock<HotCache>>,
    pub index: Arc<RwLock<BlockIndex<KV>>>,
    /// The index was empty when opened, so the cache can cover all of it.
    started_empty: bool,
}

impl<KV: KeyValueStore> IndexerContainer<KV> {
    /// Open the block index over `store` and create an empty cache.
    pub fn new(cache_config: CacheConfig, store: KV) -> Result<Self, IndexError> {
        let index = BlockIndex::open(store)?;
        let started_empty = index.tip().is_none();

        Ok(Self {
            cache: Arc::new(RwLock::new(HotCache::new(cache_config))),
            index: Arc::new(RwLock::new(index)),
            started_empty,
        })
    }

    /// Read-side API over both stores.
    pub fn facade(&self) -> QueryFacade<KV> {
        QueryFacade::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.index),
            self.started_empty,
        )
    }

    pub fn started_empty(&self) -> bool {
        self.started_empty
    }
}

impl<KV: KeyValueStore> Clone for IndexerContainer<KV> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            index: Arc::clone(&self.index),
            started_empty: self.started_empty,
        }
    }
}
