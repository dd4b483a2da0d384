//! # Domain Entities

use super::errors::KVStoreError;
use shared_types::{BlockHeight, Hash};

/// Highest indexed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTip {
    pub height: BlockHeight,
    pub hash: Hash,
}

impl ChainTip {
    const ENCODED_LEN: usize = 8 + 32;

    /// `height (u64 BE) ++ hash`, the value stored under `m:tip`.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::ENCODED_LEN);
        bytes.extend_from_slice(&self.height.to_be_bytes());
        bytes.extend_from_slice(&self.hash);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, KVStoreError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(KVStoreError::CorruptionError {
                message: format!(
                    "tip record is {} bytes, expected {}",
                    bytes.len(),
                    Self::ENCODED_LEN
                ),
            });
        }
        let (height, hash) = bytes.split_at(8);
        let mut height_bytes = [0u8; 8];
        height_bytes.copy_from_slice(height);
        let mut tip_hash = [0u8; 32];
        tip_hash.copy_from_slice(hash);

        Ok(Self {
            height: BlockHeight::from_be_bytes(height_bytes),
            hash: tip_hash,
        })
    }
}

/// Result of indexing one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The block and all its index entries were committed in one batch.
    Indexed { keys_written: usize },
    /// The hash was already indexed; nothing was written.
    AlreadyIndexed,
}

/// Whether a block would be written by `index_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Passes every check; indexing it writes a batch.
    New,
    /// Already indexed; indexing it is a no-op.
    AlreadyIndexed,
}

/// Session counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Blocks committed this session.
    pub blocks_indexed: u64,
    /// Keys written this session, tip record included.
    pub keys_written: u64,
    /// Blocks that were already indexed.
    pub duplicates: u64,
}
