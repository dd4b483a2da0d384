//! # Outbound Port
//!
//! What the reader task needs from wherever blocks come from.

use shared_types::Block;
use thiserror::Error;

/// Errors raised while reading blocks.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The underlying file or stream failed.
    #[error("block source I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// A record could not be turned into a `Block`.
    #[error("malformed block record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// A blocking, ordered producer of blocks.
pub trait BlockSource: Send {
    /// Next block, or `Ok(None)` at end-of-stream.
    fn next_block(&mut self) -> Result<Option<Block>, SourceError>;
}

impl<S: BlockSource + ?Sized> BlockSource for Box<S> {
    fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
        (**self).next_block()
    }
}
