//! # Query Facade
//!
//! Read-side API. Safe to use while the pipeline is running.
//!
//! | Query | Answered from |
//! |-------|---------------|
//! | point lookups (hash, height, txid) | cache hit, else index |
//! | max height | higher of cache and index tip |
//! | aggregates (all blocks, address views) | cache while it covers the whole index, else index |
//!
//! The cache covers the whole index only when the index was empty at
//! startup and nothing has been evicted since.

use ix_02_hot_cache::HotCache;
use ix_03_block_index::{BlockIndex, IndexError, KeyValueStore};
use parking_lot::RwLock;
use shared_types::{
    Block, BlockHeight, BlockRef, Hash, Transaction, TransactionInput, TransactionOutput,
};
use std::sync::Arc;

/// Outcome of comparing one block between cache and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    /// Cached and stored copies agree, transactions included.
    Match,
    /// Only the index has it (evicted, or indexed in an earlier session).
    NotCached,
    /// Only the cache has it. Expected only for the block a storage failure
    /// stopped on.
    MissingOnDisk,
    /// Neither has it.
    Unknown,
    /// Both have it and they differ.
    Mismatch,
}

impl Consistency {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Consistency::Match | Consistency::NotCached)
    }
}

/// Lookups over the hot cache with the block index as fallback.
pub struct QueryFacade<KV: KeyValueStore> {
    cache: Arc<RwLock<HotCache>>,
    index: Arc<RwLock<BlockIndex<KV>>>,
    index_started_empty: bool,
}

impl<KV: KeyValueStore> Clone for QueryFacade<KV> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            index: Arc::clone(&self.index),
            index_started_empty: self.index_started_empty,
        }
    }
}

impl<KV: KeyValueStore> QueryFacade<KV> {
    pub fn new(
        cache: Arc<RwLock<HotCache>>,
        index: Arc<RwLock<BlockIndex<KV>>>,
        index_started_empty: bool,
    ) -> Self {
        Self {
            cache,
            index,
            index_started_empty,
        }
    }

    fn cache_is_authoritative(&self) -> bool {
        self.index_started_empty && self.cache.read().is_complete()
    }

    pub fn get_block(&self, hash: &Hash) -> Result<Option<Block>, IndexError> {
        if let Some(block) = self.cache.read().get_block(hash).cloned() {
            return Ok(Some(block));
        }
        self.index.read().get_block(hash)
    }

    pub fn get_block_with_height(&self, height: BlockHeight) -> Result<Option<Block>, IndexError> {
        if let Some(block) = self.cache.read().get_block_by_height(height).cloned() {
            return Ok(Some(block));
        }
        self.index.read().get_block_by_height(height)
    }

    pub fn get_max_height_block(&self) -> Result<Option<Block>, IndexError> {
        let cached = self.cache.read().get_max_height_block().cloned();
        let stored = self.index.read().get_max_height_block()?;

        Ok(match (cached, stored) {
            (Some(c), Some(s)) => Some(if s.height > c.height { s } else { c }),
            (cached, stored) => cached.or(stored),
        })
    }

    /// Every indexed block, ascending by height.
    pub fn get_all_blocks(&self) -> Result<Vec<Block>, IndexError> {
        if self.cache_is_authoritative() {
            let cache = self.cache.read();
            return Ok(cache.get_all_blocks().into_iter().cloned().collect());
        }
        self.index.read().get_all_blocks()
    }

    pub fn get_transactions_with_height(
        &self,
        height: BlockHeight,
    ) -> Result<Option<Vec<Transaction>>, IndexError> {
        self.get_block_transactions(BlockRef::Height(height))
    }

    pub fn get_transactions_with_hash(
        &self,
        hash: &Hash,
    ) -> Result<Option<Vec<Transaction>>, IndexError> {
        self.get_block_transactions(BlockRef::Hash(*hash))
    }

    fn get_block_transactions(
        &self,
        block: BlockRef,
    ) -> Result<Option<Vec<Transaction>>, IndexError> {
        if let Some(txs) = self.cache.read().get_block_transactions(block) {
            return Ok(Some(txs.to_vec()));
        }
        self.index.read().get_block_transactions(block)
    }

    pub fn get_transaction_by_id(&self, id: &Hash) -> Result<Option<Transaction>, IndexError> {
        if let Some(tx) = self.cache.read().get_transaction_by_id(id).cloned() {
            return Ok(Some(tx));
        }
        self.index.read().get_transaction_by_id(id)
    }

    /// Receive-side view, same as `get_address_output_transactions`.
    pub fn get_address_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionOutput>, IndexError> {
        self.get_address_output_transactions(address)
    }

    pub fn get_address_input_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionInput>, IndexError> {
        if self.cache_is_authoritative() {
            return Ok(self.cache.read().get_address_input_transactions(address));
        }
        self.index.read().get_address_input_transactions(address)
    }

    pub fn get_address_output_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionOutput>, IndexError> {
        if self.cache_is_authoritative() {
            return Ok(self.cache.read().get_address_output_transactions(address));
        }
        self.index.read().get_address_output_transactions(address)
    }

    /// Compare the cached and stored copies of one block and of each of its
    /// transactions.
    pub fn verify_consistency(&self, hash: &Hash) -> Result<Consistency, IndexError> {
        let cached = self.cache.read().get_block(hash).cloned();
        let stored = self.index.read().get_block(hash)?;

        let (cached, stored) = match (cached, stored) {
            (Some(c), Some(s)) => (c, s),
            (None, Some(_)) => return Ok(Consistency::NotCached),
            (Some(_), None) => return Ok(Consistency::MissingOnDisk),
            (None, None) => return Ok(Consistency::Unknown),
        };
        if cached != stored {
            return Ok(Consistency::Mismatch);
        }

        for tx in &cached.transactions {
            let cached_tx = self.cache.read().get_transaction_by_id(&tx.id).cloned();
            let stored_tx = self.index.read().get_transaction_by_id(&tx.id)?;
            if cached_tx != stored_tx {
                return Ok(Consistency::Mismatch);
            }
        }
        Ok(Consistency::Match)
    }
}
