//! # Error Types
//!
//! Structural validation errors shared by the block source and the indexer.

use thiserror::Error;

/// A block that breaks a structural invariant (MalformedInput).
///
/// Recoverable: the offending block is skipped and the pipeline continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Block hash is all zeroes.
    #[error("block at height {height} has a zero hash")]
    ZeroBlockHash { height: u64 },

    /// A transaction id is all zeroes.
    #[error("transaction at position {position} has a zero id")]
    ZeroTransactionId { position: usize },

    /// The same transaction id appears twice in one block.
    #[error("transaction {tx_id} appears more than once in the block")]
    DuplicateTransaction { tx_id: String },

    /// An output carries no receiving address.
    #[error("output {index} of transaction {tx_id} has an empty address")]
    EmptyOutputAddress { tx_id: String, index: usize },
}
