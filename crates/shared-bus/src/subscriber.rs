//! # Block Subscriber
//!
//! The consuming side of the block channel, owned by the indexer task.

use crate::{ChannelError, ChannelStats};
use shared_types::Block;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Receiving half of the block channel.
pub struct BlockSubscriber {
    receiver: mpsc::Receiver<Block>,
    stats: Arc<ChannelStats>,
    capacity: usize,
    closed_early: bool,
}

impl BlockSubscriber {
    pub(crate) fn new(
        receiver: mpsc::Receiver<Block>,
        stats: Arc<ChannelStats>,
        capacity: usize,
    ) -> Self {
        Self {
            receiver,
            stats,
            capacity,
            closed_early: false,
        }
    }

    /// Wait for the next block.
    ///
    /// # Returns
    ///
    /// - `Some(block)` - The oldest queued block
    /// - `None` - The publisher is gone and every published block has been
    ///   delivered
    ///
    /// Parks the task while the channel is empty and still open.
    pub async fn recv(&mut self) -> Option<Block> {
        match self.receiver.recv().await {
            Some(block) => {
                self.stats.record_delivered();
                Some(block)
            }
            None => {
                self.on_closed();
                None
            }
        }
    }

    /// Non-blocking check for at least one queued block.
    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Remove and return the oldest queued block without waiting.
    ///
    /// - `Err(Empty)` - nothing queued, publisher still open
    /// - `Err(Closed)` - publisher gone and queue drained
    pub fn take(&mut self) -> Result<Block, ChannelError> {
        match self.receiver.try_recv() {
            Ok(block) => {
                self.stats.record_delivered();
                Ok(block)
            }
            Err(mpsc::error::TryRecvError::Empty) => Err(ChannelError::Empty),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.on_closed();
                Err(ChannelError::Closed)
            }
        }
    }

    /// Number of queued blocks.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the channel closed without an end-of-stream signal.
    pub fn closed_prematurely(&self) -> bool {
        self.closed_early
    }

    /// Shared channel counters.
    pub fn stats(&self) -> Arc<ChannelStats> {
        Arc::clone(&self.stats)
    }

    /// Stop accepting new blocks; already queued blocks can still be drained.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    fn on_closed(&mut self) {
        if self.stats.end_of_stream_signalled() {
            debug!(
                delivered = self.stats.delivered(),
                "Block channel drained after end of stream"
            );
        } else if !self.closed_early {
            self.closed_early = true;
            warn!(
                published = self.stats.published(),
                delivered = self.stats.delivered(),
                "Block channel closed before end of stream was signalled"
            );
        }
    }
}
