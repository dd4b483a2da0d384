//! # Indexer Runtime Library
//!
//! Everything the `indexer-runtime` binary wires together, exposed for the
//! workspace tests and benches.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the shared cache/index handles
//! - `handlers/` - confirmation gate, reader task, indexing task
//! - `pipeline` - runs and joins the two tasks
//! - `adapters/` - storage backends and the query facade
//! - `harness/` - golden fixture replay
//!
//! ## Data Flow
//!
//! ```text
//! BlockSource ──→ ReaderHandler ──→ [block channel] ──→ IndexingHandler
//!                                                         │ gate
//!                                                         ├──→ HotCache
//!                                                         └──→ BlockIndex ──→ KeyValueStore
//!
//! QueryFacade ──→ HotCache, falling back to BlockIndex
//! ```

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod harness;
pub mod pipeline;

pub use adapters::{open_store, Consistency, QueryFacade};
pub use container::{ConfigError, IndexerConfig, IndexerContainer, IndexerSettings, TestConfig};
pub use handlers::{ConfirmationGate, GateDecision};
pub use harness::{FixtureHarness, HarnessReport};
pub use pipeline::{Pipeline, PipelineError, RunSummary};
