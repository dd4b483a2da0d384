//! # Block Reader
//!
//! Wraps any `BlockSource` with the reader-side knobs: a cap on the number
//! of blocks produced and a pacing period between blocks (for replay and
//! backfill scenarios). Neither knob affects correctness, only throughput.

use crate::adapters::JsonFileBlockSource;
use crate::ports::{BlockSource, SourceError};
use shared_types::{Block, BlockHeight};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Reader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceConfig {
    /// JSON-lines block file.
    pub path: PathBuf,
    /// Stop after this many blocks (0 = unlimited).
    pub max_blocks: u64,
    /// Pause between consecutive blocks (zero = no pacing).
    pub publish_period: Duration,
    /// Stop on the first malformed record instead of skipping it.
    pub strict: bool,
}

impl SourceConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the block cap.
    pub fn with_max_blocks(mut self, max_blocks: u64) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// Set the pacing period.
    pub fn with_publish_period(mut self, period: Duration) -> Self {
        self.publish_period = period;
        self
    }

    /// Fail on malformed records.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// A paced, capped view over a block source.
pub struct BlockReader<S> {
    source: S,
    max_blocks: u64,
    publish_period: Duration,
    yielded: u64,
    last_height: Option<BlockHeight>,
}

impl BlockReader<JsonFileBlockSource> {
    /// Open the configured block file.
    pub fn open(config: &SourceConfig) -> Result<Self, SourceError> {
        let source = JsonFileBlockSource::open(&config.path)?.strict(config.strict);
        Ok(Self::new(source, config))
    }
}

impl<S: BlockSource> BlockReader<S> {
    pub fn new(source: S, config: &SourceConfig) -> Self {
        Self {
            source,
            max_blocks: config.max_blocks,
            publish_period: config.publish_period,
            yielded: 0,
            last_height: None,
        }
    }

    /// Blocks produced so far.
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    fn limit_reached(&self) -> bool {
        self.max_blocks > 0 && self.yielded >= self.max_blocks
    }
}

impl<S: BlockSource> BlockSource for BlockReader<S> {
    fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
        if self.limit_reached() {
            return Ok(None);
        }
        if self.yielded > 0 && !self.publish_period.is_zero() {
            std::thread::sleep(self.publish_period);
        }

        let Some(block) = self.source.next_block()? else {
            return Ok(None);
        };

        if let Some(previous) = self.last_height {
            if block.height < previous {
                warn!(
                    previous,
                    height = block.height,
                    "Block source went backwards in height"
                );
            }
        }
        self.last_height = Some(block.height);
        self.yielded += 1;
        Ok(Some(block))
    }
}
