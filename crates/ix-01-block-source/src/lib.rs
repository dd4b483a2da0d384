//! # Block Source (ix-01)
//!
//! Produces the ordered block stream the indexer consumes.
//!
//! ## Contract
//!
//! - Blocks come out in non-decreasing height order, each with its
//!   confirmation count attached.
//! - `next_block` blocks on I/O and returns `Ok(None)` at end-of-stream.
//! - No filtering happens here; the confirmation gate runs on the indexer
//!   side.
//!
//! ## Crate Structure
//!
//! - `ports` - `BlockSource` trait and `SourceError`
//! - `adapters/` - JSON-lines file source, in-memory source
//! - `reader` - `BlockReader`, applies `max_blocks` and `publish_period`
//!   to any source

pub mod adapters;
pub mod ports;
pub mod reader;

pub use adapters::{JsonFileBlockSource, MemoryBlockSource};
pub use ports::{BlockSource, SourceError};
pub use reader::{BlockReader, SourceConfig};
