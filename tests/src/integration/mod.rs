//! # Integration Tests
//!
//! Full pipeline runs: block source → channel → gate → cache and index,
//! checked through the query facade.

pub mod cancellation;
pub mod consistency;
pub mod durability;

use indexer_runtime::{IndexerContainer, IndexerSettings, Pipeline};
use ix_02_hot_cache::CacheConfig;
use ix_03_block_index::KeyValueStore;

/// Pipeline over `store` with the given gate threshold.
pub fn pipeline_over<KV: KeyValueStore + 'static>(
    store: KV,
    cache: CacheConfig,
    x_confirmations: u64,
    channel_capacity: usize,
) -> Pipeline<KV> {
    let container = IndexerContainer::new(cache, store).expect("index opens");
    let settings = IndexerSettings {
        x_confirmations,
        channel_capacity,
        ..IndexerSettings::default()
    };
    Pipeline::new(container, &settings)
}
