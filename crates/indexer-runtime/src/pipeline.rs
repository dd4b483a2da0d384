//! # Pipeline Orchestration
//!
//! Two long-lived tasks joined by one bounded channel:
//!
//! ```text
//! [reader: spawn_blocking] ──publish──→ [block channel] ──recv──→ [indexer: tokio task]
//!          ↑                                                            │
//!          └──────────────── stop signal (watch) ←── storage failure ───┘
//! ```
//!
//! The external shutdown signal is forwarded into the internal stop signal,
//! so Ctrl-C and a storage failure stop the reader the same way.

use crate::container::{IndexerContainer, IndexerSettings};
use crate::handlers::indexing::IndexingHandler;
use crate::handlers::{ConfirmationGate, ReaderHandler};
use ix_01_block_source::{BlockSource, SourceError};
use ix_03_block_index::{IndexError, KeyValueStore};
use shared_bus::block_channel;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Blocks the reader put on the channel.
    pub published: u64,
    /// Blocks the indexer took off the channel.
    pub received: u64,
    pub indexed: u64,
    pub duplicates: u64,
    pub discarded: u64,
    pub malformed: u64,
    pub failed: u64,
    /// The run stopped on the shutdown signal.
    pub cancelled: bool,
}

impl RunSummary {
    /// Published but never processed (left queued by a shutdown or a halt).
    pub fn unprocessed(&self) -> u64 {
        self.published.saturating_sub(self.received)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} indexed={} duplicates={} discarded={} malformed={} failed={} unprocessed={}",
            self.received,
            self.indexed,
            self.duplicates,
            self.discarded,
            self.malformed,
            self.failed,
            self.unprocessed()
        )
    }
}

/// Why a run did not complete.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The store failed; indexing halted. Everything committed before the
    /// failing block is intact.
    #[error("storage failure, indexing halted ({summary}): {source}")]
    Storage {
        source: IndexError,
        summary: RunSummary,
    },

    /// The block source failed. Blocks read before the failure were indexed.
    #[error("block source failed ({summary}): {source}")]
    Source {
        source: SourceError,
        summary: RunSummary,
    },

    #[error("{task} task panicked: {message}")]
    TaskPanicked { task: &'static str, message: String },
}

impl PipelineError {
    /// Counters up to the failure, when the run got that far.
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            PipelineError::Storage { summary, .. } | PipelineError::Source { summary, .. } => {
                Some(summary)
            }
            PipelineError::TaskPanicked { .. } => None,
        }
    }
}

/// Wires a block source into the container's cache and index.
pub struct Pipeline<KV: KeyValueStore> {
    container: IndexerContainer<KV>,
    gate: ConfirmationGate,
    channel_capacity: usize,
}

impl<KV: KeyValueStore + 'static> Pipeline<KV> {
    pub fn new(container: IndexerContainer<KV>, settings: &IndexerSettings) -> Self {
        Self {
            container,
            gate: ConfirmationGate::new(settings.x_confirmations),
            channel_capacity: settings.channel_capacity,
        }
    }

    pub fn container(&self) -> &IndexerContainer<KV> {
        &self.container
    }

    /// Run both tasks to completion and join them.
    ///
    /// Returns once the source is exhausted and every published block has
    /// been processed, or once `shutdown` flips to `true`.
    pub async fn run<S>(
        &self,
        source: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<RunSummary, PipelineError>
    where
        S: BlockSource + 'static,
    {
        let (publisher, subscriber) = block_channel(self.channel_capacity);
        let channel_stats = publisher.stats();

        let (stop_tx, stop_rx) = watch::channel(*shutdown.borrow());
        let stop_tx = Arc::new(stop_tx);

        let forward = tokio::spawn({
            let stop_tx = Arc::clone(&stop_tx);
            async move {
                if shutdown.wait_for(|stop| *stop).await.is_ok() {
                    info!("Shutdown requested");
                    stop_tx.send_replace(true);
                }
            }
        });

        info!(
            x_confirmations = self.gate.required(),
            channel_capacity = self.channel_capacity,
            "Starting indexing pipeline"
        );

        let reader = tokio::task::spawn_blocking({
            let stop_rx = stop_rx.clone();
            move || ReaderHandler::new(source, publisher).run(stop_rx)
        });
        let indexer = tokio::spawn(
            IndexingHandler::new(subscriber, self.gate, self.container.clone()).run(stop_rx),
        );

        let report = match indexer.await {
            Ok(report) => report,
            Err(e) => {
                stop_tx.send_replace(true);
                forward.abort();
                let _ = reader.await;
                return Err(PipelineError::TaskPanicked {
                    task: "indexer",
                    message: e.to_string(),
                });
            }
        };
        if report.failure.is_some() {
            stop_tx.send_replace(true);
        }
        let reader_result = reader.await;
        forward.abort();

        let mut summary = report.summary;
        summary.published = channel_stats.published();

        if let Some(source) = report.failure {
            error!(%summary, "Pipeline halted on storage failure");
            return Err(PipelineError::Storage { source, summary });
        }

        match reader_result {
            Ok(Ok(_)) => {
                info!(%summary, "Pipeline finished");
                Ok(summary)
            }
            Ok(Err(source)) => {
                error!(%summary, error = %source, "Pipeline stopped on source failure");
                Err(PipelineError::Source { source, summary })
            }
            Err(e) => Err(PipelineError::TaskPanicked {
                task: "reader",
                message: e.to_string(),
            }),
        }
    }
}
