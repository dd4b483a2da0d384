//! # Domain Layer
//!
//! - `entities` - `HotCache`
//! - `value_objects` - `CacheConfig`, `CacheStats`

pub mod entities;
pub mod value_objects;

pub use entities::HotCache;
pub use value_objects::{CacheConfig, CacheStats};
