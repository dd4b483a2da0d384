//! # Pipeline Handlers
//!
//! - `gate` - confirmation gate (pure)
//! - `reader` - pulls from a `BlockSource`, publishes every block
//! - `indexing` - drains the channel, gates, caches and indexes

pub mod gate;
pub mod indexing;
pub mod reader;

pub use gate::{ConfirmationGate, GateDecision};
pub use indexing::IndexingHandler;
pub use reader::ReaderHandler;
