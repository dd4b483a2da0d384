//! # Core Domain Entities
//!
//! Blocks and transactions as produced by the block source and consumed by
//! the indexer.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `Transaction`
//! - **Value flow**: `TransactionInput` (spend side), `TransactionOutput` (receive side)
//! - **Addressing**: `Hash`, `BlockRef`

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// CLUSTER A: IDENTIFIERS
// =============================================================================

/// A 32-byte hash (block hash or transaction id).
pub type Hash = [u8; 32];

/// The all-zero hash. Never a valid block hash or transaction id.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Block height in the chain.
pub type BlockHeight = u64;

/// Value in the chain's base unit.
pub type Amount = u64;

/// Reference to a block by either of its two identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    /// Look the block up by hash.
    Hash(Hash),
    /// Look the block up by height.
    Height(BlockHeight),
}

impl From<Hash> for BlockRef {
    fn from(hash: Hash) -> Self {
        BlockRef::Hash(hash)
    }
}

impl From<BlockHeight> for BlockRef {
    fn from(height: BlockHeight) -> Self {
        BlockRef::Height(height)
    }
}

/// Hex rendering for hashes in human-readable formats (JSON fixtures and
/// block files), raw bytes in binary formats (bincode values in the index).
pub mod hex_hash {
    use super::Hash;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(hash))
        } else {
            hash.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            parse(&text).map_err(D::Error::custom)
        } else {
            Hash::deserialize(deserializer)
        }
    }

    /// Parse a hex string (optionally `0x`-prefixed) into a hash.
    pub fn parse(text: &str) -> Result<Hash, String> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let bytes = hex::decode(digits).map_err(|e| format!("invalid hex hash: {e}"))?;
        Hash::try_from(bytes.as_slice())
            .map_err(|_| format!("expected 32-byte hash, got {} bytes", bytes.len()))
    }
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// A block as delivered by the block source.
///
/// Identity is `hash`. Immutable once constructed; the indexer never mutates
/// a block, it only derives index entries from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block hash.
    #[serde(with = "hex_hash")]
    pub hash: Hash,
    /// Block height in the chain.
    pub height: BlockHeight,
    /// Number of blocks built on top of this one at read time.
    pub confirmations: u64,
    /// Transactions in block order.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Check the structural invariants the indexer relies on.
    ///
    /// A block fails validation if its hash or any transaction id is zero,
    /// if a transaction id repeats inside the block, or if an output has no
    /// address.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hash == ZERO_HASH {
            return Err(ValidationError::ZeroBlockHash {
                height: self.height,
            });
        }

        let mut seen = HashSet::with_capacity(self.transactions.len());
        for (position, tx) in self.transactions.iter().enumerate() {
            if tx.id == ZERO_HASH {
                return Err(ValidationError::ZeroTransactionId { position });
            }
            if !seen.insert(tx.id) {
                return Err(ValidationError::DuplicateTransaction {
                    tx_id: hex::encode(tx.id),
                });
            }
            if let Some(index) = tx.outputs.iter().position(|o| o.address.is_empty()) {
                return Err(ValidationError::EmptyOutputAddress {
                    tx_id: hex::encode(tx.id),
                    index,
                });
            }
        }
        Ok(())
    }

    /// Short hex prefix of the hash, for log lines.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.hash[..8])
    }
}

/// A transaction: a set of spent inputs and newly created outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id, unique system-wide.
    #[serde(with = "hex_hash")]
    pub id: Hash,
    /// Prior outputs consumed by this transaction.
    #[serde(default)]
    pub inputs: Vec<TransactionInput>,
    /// New outputs created by this transaction.
    #[serde(default)]
    pub outputs: Vec<TransactionOutput>,
}

/// A prior output being consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Address the spent value came from. Empty for inputs with no address
    /// (coinbase); such inputs are not address-indexed.
    #[serde(default)]
    pub source_address: String,
    /// Value consumed.
    pub amount: Amount,
    /// Transaction that created the spent output.
    #[serde(with = "hex_hash")]
    pub spent_transaction_id: Hash,
}

impl TransactionInput {
    /// Whether this input should appear in the spend-side address index.
    pub fn has_source_address(&self) -> bool {
        !self.source_address.is_empty()
    }
}

/// A new unspent value assigned to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Receiving address.
    pub address: String,
    /// Value received.
    pub amount: Amount,
}
