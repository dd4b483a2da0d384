//! # Hot Cache (ix-02)
//!
//! In-memory mirror of what the indexer has accepted this session. Answers
//! hash, height, max-height, transaction and address lookups without
//! touching durable storage.
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | Same values as the durable index | Only admitted blocks are cached, entries are derived the same way |
//! | No duplicate address entries | Re-caching a hash leaves the address views untouched |
//! | Chronological address views | Entries ordered by (height, tx position, index) |
//! | Bounded memory (optional) | LRU on blocks, eviction cascades to transactions and addresses |
//!
//! Absence is `None` or an empty `Vec`, never an error. Once anything has
//! been evicted, `is_complete()` turns false and callers must answer
//! aggregate queries (all blocks, address views) from durable storage.

pub mod domain;

pub use domain::{CacheConfig, CacheStats, HotCache};
