//! # Reader Handler
//!
//! Runs on a blocking thread: block sources do synchronous I/O and may
//! sleep between blocks. Publishes every block unfiltered; the gate runs on
//! the indexing side.

use ix_01_block_source::{BlockSource, SourceError};
use shared_bus::{BlockPublisher, ChannelError};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Pumps a `BlockSource` into the block channel.
pub struct ReaderHandler<S: BlockSource> {
    source: S,
    publisher: BlockPublisher,
}

impl<S: BlockSource> ReaderHandler<S> {
    pub fn new(source: S, publisher: BlockPublisher) -> Self {
        Self { source, publisher }
    }

    /// Read until end-of-stream, shutdown, or a closed channel.
    ///
    /// Signals end-of-stream on every clean exit. A source error drops the
    /// publisher without the signal so the subscriber sees the early close.
    ///
    /// Returns the number of blocks published.
    pub fn run(mut self, shutdown: watch::Receiver<bool>) -> Result<u64, SourceError> {
        let mut published = 0u64;

        loop {
            if *shutdown.borrow() {
                info!(published, "Reader stopping on shutdown");
                break;
            }

            let block = match self.source.next_block() {
                Ok(Some(block)) => block,
                Ok(None) => {
                    info!(published, "Block source exhausted");
                    break;
                }
                Err(e) => {
                    error!(error = %e, published, "Block source failed");
                    return Err(e);
                }
            };

            match self.publisher.blocking_publish(block) {
                Ok(()) => published += 1,
                Err(ChannelError::Closed) => {
                    warn!(published, "Indexer stopped consuming, reader exiting");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Unexpected publish error, reader exiting");
                    break;
                }
            }
        }

        self.publisher.signal_end_of_stream();
        Ok(published)
    }
}
