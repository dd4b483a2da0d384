//! # Value Objects

use std::num::NonZeroUsize;

/// Configuration for the hot cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of blocks kept in memory. `None` keeps every block
    /// for the whole session.
    pub max_blocks: Option<NonZeroUsize>,
}

impl CacheConfig {
    /// Keep everything.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// LRU-bound the cache. A bound of zero means unbounded.
    pub fn bounded(max_blocks: usize) -> Self {
        Self {
            max_blocks: NonZeroUsize::new(max_blocks),
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Blocks currently cached.
    pub cached_blocks: usize,
    /// Transactions currently cached.
    pub cached_transactions: usize,
    /// Distinct addresses with at least one cached entry.
    pub cached_addresses: usize,
    /// Blocks evicted by the LRU bound.
    pub evictions: u64,
    /// Point lookups answered from the cache.
    pub hits: u64,
    /// Point lookups that found nothing.
    pub misses: u64,
}
