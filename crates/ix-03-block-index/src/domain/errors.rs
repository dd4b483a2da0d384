//! # Error Types
//!
//! Two layers: `KVStoreError` from the storage engine, `IndexError` from the
//! block index. Storage errors are fatal to an indexing session; malformed
//! blocks are skipped.

use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

/// Block index errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The block breaks a structural or ordering invariant. Recoverable:
    /// nothing was written.
    #[error("malformed block at height {height}: {reason}")]
    Malformed { height: u64, reason: String },

    /// The storage engine failed. Fatal for the session.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl IndexError {
    pub(crate) fn malformed(height: u64, reason: impl ToString) -> Self {
        IndexError::Malformed {
            height,
            reason: reason.to_string(),
        }
    }

    /// Whether the session can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IndexError::Malformed { .. })
    }
}

impl From<bincode::Error> for IndexError {
    fn from(err: bincode::Error) -> Self {
        IndexError::Serialization {
            message: err.to_string(),
        }
    }
}
