//! # Chain Indexer Test Suite
//!
//! Unified test crate for everything that spans more than one crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Block builders and synthetic chains
//! └── integration/      # End-to-end pipeline runs
//!     ├── scenarios.rs      # Golden scenarios (gate, spends, max height)
//!     ├── consistency.rs    # Cache vs. durable index
//!     ├── durability.rs     # Restart and crash recovery
//!     └── cancellation.rs   # Shutdown and channel behaviour
//!
//! tests/benches/
//! └── indexer_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ix-tests
//! cargo test -p ix-tests integration::durability
//! cargo bench -p ix-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
