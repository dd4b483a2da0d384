//! # Domain Entities
//!
//! The hot cache and its per-address views.

use lru::LruCache;
use shared_types::{
    Block, BlockHeight, BlockRef, Hash, Transaction, TransactionInput, TransactionOutput,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::value_objects::{CacheConfig, CacheStats};

/// Chain position of an address entry: (height, tx position, input/output index).
///
/// Same ordering as the durable address keys, so both sides list an
/// address's history identically.
type EntryPosition = (BlockHeight, u32, u32);

#[derive(Debug, Clone)]
struct AddressEntry<T> {
    position: EntryPosition,
    block: Hash,
    value: T,
}

/// Address → chronologically ordered entries.
#[derive(Debug)]
struct AddressView<T> {
    entries: HashMap<String, Vec<AddressEntry<T>>>,
}

impl<T: Clone> AddressView<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, address: &str, entry: AddressEntry<T>) {
        let entries = self.entries.entry(address.to_string()).or_default();
        // Blocks arrive in height order, so this is an append in practice.
        let at = entries.partition_point(|e| e.position <= entry.position);
        entries.insert(at, entry);
    }

    fn get(&self, address: &str) -> Vec<T> {
        self.entries
            .get(address)
            .map(|entries| entries.iter().map(|e| e.value.clone()).collect())
            .unwrap_or_default()
    }

    fn remove_block(&mut self, address: &str, block: &Hash) {
        if let Some(entries) = self.entries.get_mut(address) {
            entries.retain(|e| &e.block != block);
            if entries.is_empty() {
                self.entries.remove(address);
            }
        }
    }

    fn addresses(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

/// In-memory mirror of indexed blocks.
///
/// ## Concurrency
///
/// Reads take `&self` and never reorder the LRU (they `peek`), so the cache
/// can sit behind a `RwLock` with readers running alongside the indexer.
/// Hit/miss counters are atomics for the same reason.
///
/// ## Eviction
///
/// With `max_blocks` set, the least recently cached block is evicted when
/// the bound is reached, together with its transactions and address
/// entries. From then on `is_complete()` reports false.
pub struct HotCache {
    blocks: LruCache<Hash, Block>,
    heights: HashMap<BlockHeight, Hash>,
    transactions: HashMap<Hash, Transaction>,
    outputs: AddressView<TransactionOutput>,
    inputs: AddressView<TransactionInput>,
    max_height: Option<BlockHeight>,
    config: CacheConfig,
    evictions: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HotCache {
    pub fn new(config: CacheConfig) -> Self {
        let blocks = match config.max_blocks {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        Self {
            blocks,
            heights: HashMap::new(),
            transactions: HashMap::new(),
            outputs: AddressView::new(),
            inputs: AddressView::new(),
            max_height: None,
            config,
            evictions: 0,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache an indexed block.
    ///
    /// Re-caching a hash only refreshes its recency; address views gain
    /// nothing.
    pub fn cache_block(&mut self, block: Block) {
        if self.blocks.contains(&block.hash) {
            self.blocks.promote(&block.hash);
            self.heights.insert(block.height, block.hash);
            return;
        }

        if let Some(cap) = self.config.max_blocks {
            while self.blocks.len() >= cap.get() {
                match self.blocks.pop_lru() {
                    Some((_, evicted)) => {
                        self.evictions += 1;
                        debug!(
                            height = evicted.height,
                            hash = %evicted.short_hash(),
                            "Evicting block from hot cache"
                        );
                        self.forget(&evicted);
                    }
                    None => break,
                }
            }
        }

        self.remember(&block);
        if self.max_height.map_or(true, |max| block.height > max) {
            self.max_height = Some(block.height);
        }
        self.blocks.put(block.hash, block);
    }

    fn remember(&mut self, block: &Block) {
        self.heights.insert(block.height, block.hash);

        for (tx_pos, tx) in block.transactions.iter().enumerate() {
            let tx_pos = tx_pos as u32;
            for (index, output) in tx.outputs.iter().enumerate() {
                self.outputs.insert(
                    &output.address,
                    AddressEntry {
                        position: (block.height, tx_pos, index as u32),
                        block: block.hash,
                        value: output.clone(),
                    },
                );
            }
            for (index, input) in tx.inputs.iter().enumerate() {
                if !input.has_source_address() {
                    continue;
                }
                self.inputs.insert(
                    &input.source_address,
                    AddressEntry {
                        position: (block.height, tx_pos, index as u32),
                        block: block.hash,
                        value: input.clone(),
                    },
                );
            }
            self.transactions.insert(tx.id, tx.clone());
        }
    }

    /// Drop a block whose durable write failed.
    ///
    /// Unlike eviction this keeps `is_complete()` as it was: the block was
    /// never indexed, so nothing indexed is missing from the cache.
    pub fn remove_block(&mut self, hash: &Hash) -> Option<Block> {
        let block = self.blocks.pop(hash)?;
        self.forget(&block);
        Some(block)
    }

    fn forget(&mut self, block: &Block) {
        if self.heights.get(&block.height) == Some(&block.hash) {
            self.heights.remove(&block.height);
        }
        for tx in &block.transactions {
            self.transactions.remove(&tx.id);
            for output in &tx.outputs {
                self.outputs.remove_block(&output.address, &block.hash);
            }
            for input in tx.inputs.iter().filter(|i| i.has_source_address()) {
                self.inputs.remove_block(&input.source_address, &block.hash);
            }
        }
        if self.max_height == Some(block.height) && !self.heights.contains_key(&block.height) {
            self.max_height = self.heights.keys().max().copied();
        }
    }

    fn record<T>(&self, found: Option<T>) -> Option<T> {
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Block by hash.
    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.record(self.blocks.peek(hash))
    }

    /// Block by height.
    pub fn get_block_by_height(&self, height: BlockHeight) -> Option<&Block> {
        let block = self
            .heights
            .get(&height)
            .and_then(|hash| self.blocks.peek(hash));
        self.record(block)
    }

    /// Highest cached block.
    pub fn get_max_height_block(&self) -> Option<&Block> {
        self.max_height
            .and_then(|height| self.get_block_by_height(height))
    }

    /// Every cached block, ascending by height.
    pub fn get_all_blocks(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks.iter().map(|(_, block)| block).collect();
        blocks.sort_by_key(|block| block.height);
        blocks
    }

    /// Transactions of a block, in block order.
    pub fn get_block_transactions(&self, block: BlockRef) -> Option<&[Transaction]> {
        let block = match block {
            BlockRef::Hash(hash) => self.get_block(&hash),
            BlockRef::Height(height) => self.get_block_by_height(height),
        };
        block.map(|b| b.transactions.as_slice())
    }

    /// Transaction by id.
    pub fn get_transaction_by_id(&self, id: &Hash) -> Option<&Transaction> {
        self.record(self.transactions.get(id))
    }

    /// Outputs received by `address`. Same as
    /// [`get_address_output_transactions`](Self::get_address_output_transactions).
    pub fn get_address_transactions(&self, address: &str) -> Vec<TransactionOutput> {
        self.get_address_output_transactions(address)
    }

    /// Inputs spent from `address`, oldest first.
    pub fn get_address_input_transactions(&self, address: &str) -> Vec<TransactionInput> {
        self.inputs.get(address)
    }

    /// Outputs received by `address`, oldest first.
    pub fn get_address_output_transactions(&self, address: &str) -> Vec<TransactionOutput> {
        self.outputs.get(address)
    }

    /// True while nothing has been evicted, i.e. aggregate answers are
    /// authoritative.
    pub fn is_complete(&self) -> bool {
        self.evictions == 0
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        let mut addresses: Vec<&String> = self
            .outputs
            .addresses()
            .chain(self.inputs.addresses())
            .collect();
        addresses.sort_unstable();
        addresses.dedup();

        CacheStats {
            cached_blocks: self.blocks.len(),
            cached_transactions: self.transactions.len(),
            cached_addresses: addresses.len(),
            evictions: self.evictions,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for HotCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
