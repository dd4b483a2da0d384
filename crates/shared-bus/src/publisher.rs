//! # Block Publisher
//!
//! The producing side of the block channel, owned by the reader task.

use crate::{ChannelError, ChannelStats};
use shared_types::Block;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Sending half of the block channel.
///
/// Dropping the publisher closes the channel. Closing through
/// [`BlockPublisher::signal_end_of_stream`] additionally records that the
/// stream ended normally, so the subscriber can tell a clean end from a
/// reader that went away early.
pub struct BlockPublisher {
    sender: mpsc::Sender<Block>,
    stats: Arc<ChannelStats>,
}

impl BlockPublisher {
    pub(crate) fn new(sender: mpsc::Sender<Block>, stats: Arc<ChannelStats>) -> Self {
        Self { sender, stats }
    }

    /// Enqueue a block, waiting for capacity when the channel is full.
    ///
    /// Fails with `Closed` once the subscriber has been dropped.
    pub async fn publish(&self, block: Block) -> Result<(), ChannelError> {
        let height = block.height;
        self.sender.send(block).await.map_err(|_| {
            warn!(height, "Block dropped: subscriber gone");
            ChannelError::Closed
        })?;
        self.stats.record_published();
        debug!(height, "Block published");
        Ok(())
    }

    /// Blocking variant of [`publish`](Self::publish) for synchronous reader
    /// threads.
    ///
    /// Must not be called from inside an async context.
    pub fn blocking_publish(&self, block: Block) -> Result<(), ChannelError> {
        let height = block.height;
        self.sender.blocking_send(block).map_err(|_| {
            warn!(height, "Block dropped: subscriber gone");
            ChannelError::Closed
        })?;
        self.stats.record_published();
        debug!(height, "Block published");
        Ok(())
    }

    /// Enqueue a block without waiting.
    pub fn try_publish(&self, block: Block) -> Result<(), ChannelError> {
        match self.sender.try_send(block) {
            Ok(()) => {
                self.stats.record_published();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(ChannelError::Full),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ChannelError::Closed),
        }
    }

    /// Mark the stream as finished and close the channel.
    ///
    /// Blocks already queued stay available to the subscriber.
    pub fn signal_end_of_stream(self) {
        self.stats.mark_end_of_stream();
        debug!(published = self.stats.published(), "End of stream signalled");
        drop(self.sender);
    }

    /// Whether the subscriber has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Shared channel counters.
    pub fn stats(&self) -> Arc<ChannelStats> {
        Arc::clone(&self.stats)
    }
}
