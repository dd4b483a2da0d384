//! # Block Index Service
//!
//! The system of record. Every accepted block becomes one atomic batch:
//!
//! ```text
//! b:{hash}                       -> Block
//! h:{height}                     -> hash
//! t:{txid}             (per tx)  -> Transaction
//! o:{addr}{position}   (per out) -> TransactionOutput
//! i:{addr}{position}   (per in)  -> TransactionInput   (addressed inputs only)
//! m:tip                          -> height ++ hash
//! ```
//!
//! ## Invariants
//!
//! - A hash is indexed at most once; a repeat is `AlreadyIndexed`.
//! - Heights strictly increase; anything at or below the tip is malformed.
//! - A failed batch leaves the store and the in-memory tip untouched.

use crate::domain::entities::{Admission, ChainTip, IndexOutcome, IndexStats};
use crate::domain::errors::IndexError;
use crate::domain::keys::{KeyPrefix, MAX_ADDRESS_LEN};
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use serde::de::DeserializeOwned;
use shared_types::{
    Block, BlockHeight, BlockRef, Hash, Transaction, TransactionInput, TransactionOutput,
};
use tracing::{debug, info};

/// Durable block, transaction and address indices over a `KeyValueStore`.
pub struct BlockIndex<KV: KeyValueStore> {
    store: KV,
    tip: Option<ChainTip>,
    stats: IndexStats,
}

impl<KV: KeyValueStore> BlockIndex<KV> {
    /// Open the index, recovering the tip from whatever the store holds.
    pub fn open(store: KV) -> Result<Self, IndexError> {
        let tip = Self::recover_tip(&store)?;
        match tip {
            Some(tip) => info!(
                height = tip.height,
                hash = %hex_prefix(&tip.hash),
                "Recovered index tip"
            ),
            None => info!("Opened empty index"),
        }

        Ok(Self {
            store,
            tip,
            stats: IndexStats::default(),
        })
    }

    fn recover_tip(store: &KV) -> Result<Option<ChainTip>, IndexError> {
        if let Some(bytes) = store.get(&KeyPrefix::tip_key())? {
            return Ok(Some(ChainTip::decode(&bytes)?));
        }

        // Stores written without a tip record: the last height key wins.
        let heights = store.prefix_scan(KeyPrefix::BlockByHeight.as_bytes())?;
        let Some((key, value)) = heights.last() else {
            return Ok(None);
        };
        let height = KeyPrefix::height_from_key(key).ok_or_else(|| IndexError::Serialization {
            message: "height key with a bad suffix".to_string(),
        })?;
        Ok(Some(ChainTip {
            height,
            hash: decode_hash(value)?,
        }))
    }

    /// Check a block against every invariant without writing anything.
    pub fn admit(&self, block: &Block) -> Result<Admission, IndexError> {
        if self.store.exists(&KeyPrefix::block_key(&block.hash))? {
            return Ok(Admission::AlreadyIndexed);
        }

        block
            .validate()
            .map_err(|e| IndexError::malformed(block.height, e))?;

        if let Some(tip) = self.tip {
            if block.height <= tip.height {
                return Err(IndexError::malformed(
                    block.height,
                    format!("height does not advance past tip {}", tip.height),
                ));
            }
        }

        for tx in &block.transactions {
            if self.store.exists(&KeyPrefix::transaction_key(&tx.id))? {
                return Err(IndexError::malformed(
                    block.height,
                    format!("transaction {} is already indexed", hex_prefix(&tx.id)),
                ));
            }
            let addresses = tx
                .outputs
                .iter()
                .map(|o| o.address.as_str())
                .chain(tx.inputs.iter().map(|i| i.source_address.as_str()));
            for address in addresses {
                if address.len() > MAX_ADDRESS_LEN {
                    return Err(IndexError::malformed(
                        block.height,
                        format!("address of {} bytes is too long", address.len()),
                    ));
                }
            }
        }

        Ok(Admission::New)
    }

    /// Index one block in a single atomic batch.
    pub fn index_block(&mut self, block: &Block) -> Result<IndexOutcome, IndexError> {
        if self.admit(block)? == Admission::AlreadyIndexed {
            self.stats.duplicates += 1;
            debug!(height = block.height, hash = %block.short_hash(), "Block already indexed");
            return Ok(IndexOutcome::AlreadyIndexed);
        }

        let operations = Self::build_batch(block)?;
        let keys_written = operations.len();
        self.store.atomic_batch_write(operations)?;

        self.tip = Some(ChainTip {
            height: block.height,
            hash: block.hash,
        });
        self.stats.blocks_indexed += 1;
        self.stats.keys_written += keys_written as u64;
        debug!(
            height = block.height,
            hash = %block.short_hash(),
            transactions = block.transactions.len(),
            keys_written,
            "Indexed block"
        );

        Ok(IndexOutcome::Indexed { keys_written })
    }

    fn build_batch(block: &Block) -> Result<Vec<BatchOperation>, IndexError> {
        let mut ops = Vec::with_capacity(3 + block.transactions.len() * 3);

        ops.push(BatchOperation::put(
            KeyPrefix::block_key(&block.hash),
            bincode::serialize(block)?,
        ));
        ops.push(BatchOperation::put(
            KeyPrefix::height_key(block.height),
            block.hash.to_vec(),
        ));

        for (tx_pos, tx) in block.transactions.iter().enumerate() {
            let tx_pos = tx_pos as u32;
            ops.push(BatchOperation::put(
                KeyPrefix::transaction_key(&tx.id),
                bincode::serialize(tx)?,
            ));
            for (index, output) in tx.outputs.iter().enumerate() {
                ops.push(BatchOperation::put(
                    KeyPrefix::AddressOutput.address_key(
                        &output.address,
                        block.height,
                        tx_pos,
                        index as u32,
                    ),
                    bincode::serialize(output)?,
                ));
            }
            for (index, input) in tx.inputs.iter().enumerate() {
                if !input.has_source_address() {
                    continue;
                }
                ops.push(BatchOperation::put(
                    KeyPrefix::AddressInput.address_key(
                        &input.source_address,
                        block.height,
                        tx_pos,
                        index as u32,
                    ),
                    bincode::serialize(input)?,
                ));
            }
        }

        let tip = ChainTip {
            height: block.height,
            hash: block.hash,
        };
        ops.push(BatchOperation::put(KeyPrefix::tip_key(), tip.encode()));

        Ok(ops)
    }

    /// Highest indexed block reference.
    pub fn tip(&self) -> Option<ChainTip> {
        self.tip
    }

    pub fn contains(&self, hash: &Hash) -> Result<bool, IndexError> {
        Ok(self.store.exists(&KeyPrefix::block_key(hash))?)
    }

    pub fn get_block(&self, hash: &Hash) -> Result<Option<Block>, IndexError> {
        self.get_decoded(&KeyPrefix::block_key(hash))
    }

    pub fn get_block_by_height(&self, height: BlockHeight) -> Result<Option<Block>, IndexError> {
        match self.store.get(&KeyPrefix::height_key(height))? {
            Some(hash) => self.get_block(&decode_hash(&hash)?),
            None => Ok(None),
        }
    }

    pub fn get_max_height_block(&self) -> Result<Option<Block>, IndexError> {
        match self.tip {
            Some(tip) => self.get_block(&tip.hash),
            None => Ok(None),
        }
    }

    /// Every indexed block, ascending by height.
    pub fn get_all_blocks(&self) -> Result<Vec<Block>, IndexError> {
        let heights = self
            .store
            .prefix_scan(KeyPrefix::BlockByHeight.as_bytes())?;
        let mut blocks = Vec::with_capacity(heights.len());
        for (_, hash) in heights {
            let hash = decode_hash(&hash)?;
            let block = self.get_block(&hash)?.ok_or_else(|| IndexError::Serialization {
                message: format!("height index points at missing block {}", hex_prefix(&hash)),
            })?;
            blocks.push(block);
        }
        Ok(blocks)
    }

    pub fn get_block_transactions(
        &self,
        block: BlockRef,
    ) -> Result<Option<Vec<Transaction>>, IndexError> {
        let block = match block {
            BlockRef::Hash(hash) => self.get_block(&hash)?,
            BlockRef::Height(height) => self.get_block_by_height(height)?,
        };
        Ok(block.map(|b| b.transactions))
    }

    pub fn get_transaction_by_id(&self, id: &Hash) -> Result<Option<Transaction>, IndexError> {
        self.get_decoded(&KeyPrefix::transaction_key(id))
    }

    /// Outputs received by `address`; same as `get_address_output_transactions`.
    pub fn get_address_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionOutput>, IndexError> {
        self.get_address_output_transactions(address)
    }

    /// Inputs spent from `address`, oldest first.
    pub fn get_address_input_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionInput>, IndexError> {
        self.scan_address(KeyPrefix::AddressInput, address)
    }

    /// Outputs received by `address`, oldest first.
    pub fn get_address_output_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<TransactionOutput>, IndexError> {
        self.scan_address(KeyPrefix::AddressOutput, address)
    }

    fn scan_address<T: DeserializeOwned>(
        &self,
        prefix: KeyPrefix,
        address: &str,
    ) -> Result<Vec<T>, IndexError> {
        if address.len() > MAX_ADDRESS_LEN {
            return Ok(Vec::new());
        }
        self.store
            .prefix_scan(&prefix.address_prefix(address))?
            .iter()
            .map(|(_, value)| bincode::deserialize(value).map_err(IndexError::from))
            .collect()
    }

    fn get_decoded<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, IndexError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn store(&self) -> &KV {
        &self.store
    }

    pub fn into_store(self) -> KV {
        self.store
    }
}

fn decode_hash(bytes: &[u8]) -> Result<Hash, IndexError> {
    bytes.try_into().map_err(|_| IndexError::Serialization {
        message: format!("stored hash is {} bytes, expected 32", bytes.len()),
    })
}

fn hex_prefix(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}
