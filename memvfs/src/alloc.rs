use std::collections::VecDeque;

use log::debug;

use crate::io::BlockNumber;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State {
    Free,
    Used,
}

/// Implements a FIFO block allocation policy. Allocation takes the block at the
/// front of the queue and release appends to the back, so freed blocks are
/// reused in the order they were released.
///
/// Blocks are fixed size and never relocated, so there is no external
/// fragmentation to coalesce.
///
/// A block is in the queue if and only if its state is `State::Free`. Every
/// block not in the queue is owned by exactly one file.
#[derive(Debug)]
pub struct FreeList {
    /// Unused block numbers in allocation order.
    queue: VecDeque<BlockNumber>,
    /// Tracks the state of each block, indexed by block number.
    states: Vec<State>,
}

impl FreeList {
    /// Creates an allocator where every one of `total` blocks is free, queued in
    /// ascending order.
    pub fn new(total: usize) -> Self {
        Self {
            queue: (0..total).collect(),
            states: vec![State::Free; total],
        }
    }

    /// Removes and returns the block at the front of the queue, or `None` when
    /// every block is in use.
    pub fn allocate(&mut self) -> Option<BlockNumber> {
        let blocknr = self.queue.pop_front()?;
        self.states[blocknr] = State::Used;
        debug!("allocated block {}, {} free", blocknr, self.queue.len());
        Some(blocknr)
    }

    /// Returns a block to the back of the queue.
    ///
    /// # Panics
    ///
    /// The block must be in range and currently in use. Releasing a free block
    /// would hand the same block to two files.
    pub fn release(&mut self, blocknr: BlockNumber) {
        assert!(blocknr < self.states.len(), "block {} out of range", blocknr);
        assert_eq!(
            self.states[blocknr],
            State::Used,
            "block {} released while free",
            blocknr
        );
        self.states[blocknr] = State::Free;
        self.queue.push_back(blocknr);
        debug!("released block {}, {} free", blocknr, self.queue.len());
    }

    /// Releases each block in iteration order.
    pub fn release_all<I>(&mut self, blocks: I)
    where
        I: IntoIterator<Item = BlockNumber>,
    {
        for blocknr in blocks {
            self.release(blocknr);
        }
    }

    pub fn get(&self, blocknr: BlockNumber) -> State {
        self.states[blocknr]
    }

    pub fn free_count(&self) -> usize {
        self.queue.len()
    }

    pub fn used_count(&self) -> usize {
        self.total_blocks() - self.free_count()
    }

    pub fn total_blocks(&self) -> usize {
        self.states.len()
    }
}
