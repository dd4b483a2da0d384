//! # Block Source Adapters
//!
//! - `json_file` - JSON-lines block files (production)
//! - `memory` - pre-built block lists (tests, benches, replays)

mod json_file;
mod memory;

pub use json_file::JsonFileBlockSource;
pub use memory::MemoryBlockSource;
