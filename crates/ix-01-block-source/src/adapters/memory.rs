use crate::ports::{BlockSource, SourceError};
use shared_types::Block;
use std::collections::VecDeque;

/// Block source backed by an in-memory list.
#[derive(Debug, Default)]
pub struct MemoryBlockSource {
    blocks: VecDeque<Block>,
}

impl MemoryBlockSource {
    pub fn new(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
        }
    }

    /// Blocks not yet handed out.
    pub fn remaining(&self) -> usize {
        self.blocks.len()
    }
}

impl BlockSource for MemoryBlockSource {
    fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
        Ok(self.blocks.pop_front())
    }
}
