//! # Shared Types Crate
//!
//! The data model every other crate in the workspace speaks: blocks,
//! transactions, inputs and outputs, plus the structural validation rules a
//! block must satisfy before it may be indexed.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-crate types are defined here.
//! - **Immutable records**: a `Block` is never mutated after the block source
//!   builds it; every index entry is derived from it.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
