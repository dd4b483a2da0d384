//! # Shared Bus - Block Channel Between Reader and Indexer
//!
//! The single synchronization point between the reader task and the indexer
//! task.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐   recv()   ┌──────────────┐
//! │ Block Source │ ────────────→ │ Block Channel│ ─────────→ │   Indexer    │
//! │   (reader)   │               │  (bounded)   │            │              │
//! └──────────────┘               └──────────────┘            └──────────────┘
//!        │ signal_end_of_stream()        ↑
//!        └───────────────────────────────┘
//! ```
//!
//! ## Termination
//!
//! End-of-stream is the channel's closed state, not a separate flag the
//! consumer polls. `BlockSubscriber::recv` yields `None` only once the
//! publisher is gone **and** every published block has been delivered, so a
//! block published right before `signal_end_of_stream` is never lost.
//!
//! ## Capacity
//!
//! The channel is bounded. A full channel makes the reader wait
//! (backpressure) instead of growing memory without limit; a dropped
//! subscriber turns that wait into `ChannelError::Closed`.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod publisher;
pub mod subscriber;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

pub use publisher::BlockPublisher;
pub use subscriber::BlockSubscriber;

/// Maximum blocks buffered between reader and indexer before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Errors from channel operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The other side is gone; for `take`, the channel is closed and drained.
    #[error("block channel closed")]
    Closed,
    /// `try_publish` found no free slot.
    #[error("block channel full")]
    Full,
    /// `take` found nothing queued, but more blocks may still arrive.
    #[error("no pending block")]
    Empty,
}

/// Counters shared by both ends of a channel.
#[derive(Debug, Default)]
pub struct ChannelStats {
    published: AtomicU64,
    delivered: AtomicU64,
    end_of_stream: AtomicBool,
}

impl ChannelStats {
    /// Blocks accepted by `publish`.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Blocks handed to the subscriber.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Whether the producer closed the channel deliberately.
    pub fn end_of_stream_signalled(&self) -> bool {
        self.end_of_stream.load(Ordering::Acquire)
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn mark_end_of_stream(&self) {
        self.end_of_stream.store(true, Ordering::Release);
    }
}

/// Create a bounded block channel.
///
/// A capacity of zero is bumped to one; tokio rejects empty buffers.
#[must_use]
pub fn block_channel(capacity: usize) -> (BlockPublisher, BlockSubscriber) {
    let capacity = capacity.max(1);
    let (sender, receiver) = mpsc::channel(capacity);
    let stats = Arc::new(ChannelStats::default());
    (
        BlockPublisher::new(sender, Arc::clone(&stats)),
        BlockSubscriber::new(receiver, stats, capacity),
    )
}
