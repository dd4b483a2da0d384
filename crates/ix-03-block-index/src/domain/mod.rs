//! # Domain Layer
//!
//! - `entities` - `ChainTip`, `IndexOutcome`, `Admission`, `IndexStats`
//! - `errors` - `IndexError`, `KVStoreError`
//! - `keys` - `KeyPrefix` and the binary key layout

pub mod entities;
pub mod errors;
pub mod keys;

pub use entities::{Admission, ChainTip, IndexOutcome, IndexStats};
pub use errors::{IndexError, KVStoreError};
pub use keys::{KeyPrefix, MAX_ADDRESS_LEN};
