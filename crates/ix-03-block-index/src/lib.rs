//! # Block Index (ix-03)
//!
//! Durable indexer: persists accepted blocks and their derived indices to an
//! ordered key-value store, one atomic batch per block.
//!
//! ## Index Families
//!
//! | Family | Lookup |
//! |--------|--------|
//! | block-by-hash | `get_block` |
//! | block-by-height | `get_block_by_height`, `get_all_blocks`, `get_max_height_block` |
//! | transaction-by-id | `get_transaction_by_id` |
//! | address→output | `get_address_output_transactions` (receive side) |
//! | address→input | `get_address_input_transactions` (spend side) |
//!
//! Every family is a pure function of the set of indexed blocks.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): key layout, tip record, errors
//! - **Ports Layer** (`ports/`): `KeyValueStore` outbound port
//! - **Adapters Layer** (`adapters/`): in-memory, file-backed and
//!   fault-injecting stores
//! - **Service** (`service`): `BlockIndex`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FaultInjectingKVStore, FaultSwitch, FileBackedKVStore, InMemoryKVStore};
pub use domain::{
    Admission, ChainTip, IndexError, IndexOutcome, IndexStats, KVStoreError, KeyPrefix,
};
pub use ports::{BatchOperation, KeyValueStore, ScanResult};
pub use service::BlockIndex;
