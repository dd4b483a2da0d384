//! # Indexing Handler
//!
//! The only writer of the hot cache and the block index. For every block,
//! in channel order:
//!
//! ```text
//! recv ──→ gate ──discard──→ (counted, logged)
//!            │
//!          accept
//!            ↓
//!          admit ──already indexed──→ (counted)
//!            │   ──malformed──────→ (counted, warned, skipped)
//!           new
//!            ↓
//!      cache_block ──→ index_block ──storage error──→ uncache, halt
//! ```
//!
//! A block whose commit fails is taken back out of the cache, so queries
//! never see a block the durable index does not hold.

use crate::container::IndexerContainer;
use crate::handlers::gate::{ConfirmationGate, GateDecision};
use crate::pipeline::RunSummary;
use ix_03_block_index::{Admission, IndexError, IndexOutcome, KVStoreError, KeyValueStore};
use shared_bus::BlockSubscriber;
use shared_types::Block;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What the indexing task hands back when it stops.
#[derive(Debug)]
pub struct IndexingReport {
    pub summary: RunSummary,
    /// The storage error that halted the task, if any.
    pub failure: Option<IndexError>,
}

/// Drains the block channel into the cache and the index.
pub struct IndexingHandler<KV: KeyValueStore> {
    subscriber: BlockSubscriber,
    gate: ConfirmationGate,
    container: IndexerContainer<KV>,
    summary: RunSummary,
}

impl<KV: KeyValueStore + 'static> IndexingHandler<KV> {
    pub fn new(
        subscriber: BlockSubscriber,
        gate: ConfirmationGate,
        container: IndexerContainer<KV>,
    ) -> Self {
        Self {
            subscriber,
            gate,
            container,
            summary: RunSummary::default(),
        }
    }

    /// Run until the channel is closed and drained, shutdown is signalled,
    /// or storage fails.
    ///
    /// Shutdown is observed between blocks: the block being processed is
    /// finished, anything still queued is left alone.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> IndexingReport {
        let failure = loop {
            if *shutdown.borrow() {
                info!(
                    pending = self.subscriber.pending(),
                    "Indexer stopping on shutdown"
                );
                self.summary.cancelled = true;
                break None;
            }

            let next = tokio::select! {
                biased;
                Ok(()) = shutdown.changed() => continue,
                next = self.subscriber.recv() => next,
            };

            let Some(block) = next else {
                debug!("Block channel closed and drained");
                break None;
            };

            if let Err(e) = self.process(block).await {
                break Some(e);
            }
        };

        IndexingReport {
            summary: self.summary,
            failure,
        }
    }

    async fn process(&mut self, block: Block) -> Result<(), IndexError> {
        self.summary.received += 1;

        if let GateDecision::Discard {
            confirmations,
            required,
        } = self.gate.inspect(&block)
        {
            info!(
                height = block.height,
                confirmations,
                required,
                "Discarding block below confirmation threshold"
            );
            self.summary.discarded += 1;
            return Ok(());
        }

        let admission = self.container.index.read().admit(&block);
        match admission {
            Ok(Admission::New) => {}
            Ok(Admission::AlreadyIndexed) => {
                debug!(height = block.height, "Block already indexed, skipping");
                self.summary.duplicates += 1;
                return Ok(());
            }
            Err(e) => return self.reject(&block, e),
        }

        self.container.cache.write().cache_block(block.clone());

        let outcome = self.commit(block.clone()).await;
        match outcome {
            Ok(IndexOutcome::Indexed { .. }) => {
                self.summary.indexed += 1;
                Ok(())
            }
            Ok(IndexOutcome::AlreadyIndexed) => {
                self.summary.duplicates += 1;
                Ok(())
            }
            Err(e) => {
                self.container.cache.write().remove_block(&block.hash);
                self.reject(&block, e)
            }
        }
    }

    /// Store commits are synchronous (file rewrites, fsync), so they run on
    /// the blocking pool instead of an async worker.
    async fn commit(&self, block: Block) -> Result<IndexOutcome, IndexError> {
        let index = Arc::clone(&self.container.index);
        tokio::task::spawn_blocking(move || index.write().index_block(&block))
            .await
            .unwrap_or_else(|e| {
                Err(IndexError::Storage(KVStoreError::IOError {
                    message: format!("commit task failed: {e}"),
                }))
            })
    }

    fn reject(&mut self, block: &Block, err: IndexError) -> Result<(), IndexError> {
        if err.is_recoverable() {
            warn!(
                height = block.height,
                hash = %block.short_hash(),
                error = %err,
                "Skipping malformed block"
            );
            self.summary.malformed += 1;
            Ok(())
        } else {
            error!(
                height = block.height,
                hash = %block.short_hash(),
                error = %err,
                "Storage failure, halting indexer"
            );
            self.summary.failed += 1;
            Err(err)
        }
    }
}
