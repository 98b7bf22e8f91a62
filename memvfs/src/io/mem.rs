use std::io::{Error, ErrorKind};
use std::ops::Range;

use crate::config::{VfsConfig, DEFAULT_BLOCK_SIZE, DEFAULT_TOTAL_BLOCKS};
use crate::io::block::{BlockNumber, BlockStorage};

/// Emulates a block device with a single contiguous byte arena held in memory.
/// Contents are lost when the store is dropped.
#[derive(Debug)]
pub struct MemoryBlockStore {
    /// Always exactly `block_count * block_size` bytes long.
    arena: Vec<u8>,
    block_size: usize,
    block_count: usize,
}

impl MemoryBlockStore {
    /// Byte range of the arena backing `blocknr`.
    fn range(&self, blocknr: BlockNumber) -> std::io::Result<Range<usize>> {
        if blocknr >= self.block_count {
            return Err(Error::new(ErrorKind::InvalidInput, "block out of range"));
        }
        let start = blocknr * self.block_size;
        Ok(start..start + self.block_size)
    }

    /// Total bytes held by the store.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }
}

impl BlockStorage for MemoryBlockStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> usize {
        self.block_count
    }

    fn read_block(&self, blocknr: BlockNumber, buf: &mut [u8]) -> std::io::Result<()> {
        let range = self.range(blocknr)?;
        if buf.len() < self.block_size {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "buffer does not contain enough space to read block",
            ));
        }
        buf[..self.block_size].copy_from_slice(&self.arena[range]);
        Ok(())
    }

    fn write_block(&mut self, blocknr: BlockNumber, buf: &[u8]) -> std::io::Result<()> {
        let range = self.range(blocknr)?;
        if buf.len() > self.block_size {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "buffer exceeds the block size",
            ));
        }
        let block = &mut self.arena[range];
        let (data, tail) = block.split_at_mut(buf.len());
        data.copy_from_slice(buf);
        tail.fill(0);
        Ok(())
    }
}

pub struct MemoryBlockStoreBuilder {
    block_size: usize,
    block_count: usize,
}

impl Default for MemoryBlockStoreBuilder {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            block_count: DEFAULT_TOTAL_BLOCKS,
        }
    }
}

impl From<&VfsConfig> for MemoryBlockStoreBuilder {
    fn from(config: &VfsConfig) -> Self {
        Self {
            block_size: config.block_size,
            block_count: config.total_blocks,
        }
    }
}

impl MemoryBlockStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of desired blocks in the block store device.
    pub fn with_block_count(mut self, blocks: usize) -> Self {
        self.block_count = blocks;
        self
    }

    /// Sets the size in bytes of each block.
    pub fn with_block_size(mut self, bytes: usize) -> Self {
        self.block_size = bytes;
        self
    }

    /// Allocates the zeroed arena.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidInput` on an empty geometry or one whose byte size
    /// overflows `usize`.
    pub fn build(self) -> std::io::Result<MemoryBlockStore> {
        if self.block_count == 0 || self.block_size == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "block store needs a non-zero block count and block size",
            ));
        }
        let bytes = self
            .block_count
            .checked_mul(self.block_size)
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "block store too large"))?;
        Ok(MemoryBlockStore {
            arena: vec![0x00; bytes],
            block_size: self.block_size,
            block_count: self.block_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(blocks: usize) -> MemoryBlockStore {
        MemoryBlockStoreBuilder::new()
            .with_block_count(blocks)
            .with_block_size(64)
            .build()
            .expect("failed to allocate block store")
    }

    #[test]
    fn store_allocates_correct_num_bytes() {
        let store = store(4);
        assert_eq!(store.capacity(), 4 * 64);
        assert_eq!(store.block_count(), 4);
        assert_eq!(store.block_size(), 64);
    }

    #[test]
    fn can_read_and_write_blocks() {
        let mut store = store(4);

        // Allocate a block with a non-zero character.
        let block = vec![0x55; 64];
        store.write_block(2, &block).unwrap();

        let mut read_block = vec![0x00; 64];
        // Read a different block.
        store.read_block(3, &mut read_block).unwrap();
        assert_eq!(read_block, vec![0x00; 64]);

        // Read the block with data.
        let mut filled_block = vec![0x00; 64];
        store.read_block(2, &mut filled_block).unwrap();
        assert_eq!(filled_block, vec![0x55; 64]);
    }

    #[test]
    fn can_read_and_write_start_and_end_blocks() {
        let mut store = store(2);

        store.write_block(0, &[0x11; 64]).unwrap();
        store.write_block(1, &[0x22; 64]).unwrap();

        let mut read_block = vec![0x00; 64];
        store.read_block(0, &mut read_block).unwrap();
        assert_eq!(read_block, vec![0x11; 64]);
        store.read_block(1, &mut read_block).unwrap();
        assert_eq!(read_block, vec![0x22; 64]);
    }

    #[test]
    fn access_beyond_range_returns_error() {
        let mut store = store(1);

        let wresult = store.write_block(1, &[0x55; 64]);
        assert_eq!(wresult.unwrap_err().kind(), ErrorKind::InvalidInput);

        let mut buf = vec![0; 64];
        assert!(store.read_block(1, &mut buf).is_err());
    }

    #[test]
    fn short_write_zero_fills_remainder_of_block() {
        let mut store = store(1);
        store.write_block(0, &[0xff; 64]).unwrap();

        // Fill half the block with meaningful data.
        store.write_block(0, &[0x55; 32]).unwrap();

        let mut buf = vec![0; 64];
        store.read_block(0, &mut buf).unwrap();
        assert_eq!(&buf[..32], &[0x55; 32][..]);
        assert_eq!(&buf[32..], &[0x00; 32][..]);
    }

    #[test]
    fn oversized_buffers_are_rejected() {
        let mut store = store(2);
        assert!(store.write_block(0, &[0x55; 65]).is_err());

        let mut small = vec![0; 63];
        assert!(store.read_block(0, &mut small).is_err());
    }

    #[test]
    fn builder_rejects_empty_geometry() {
        assert!(MemoryBlockStoreBuilder::new()
            .with_block_count(0)
            .build()
            .is_err());
        assert!(MemoryBlockStoreBuilder::new()
            .with_block_size(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_follows_config_geometry() {
        let config = VfsConfig::new().with_total_blocks(4).with_block_size(2);
        let store = MemoryBlockStoreBuilder::from(&config).build().unwrap();
        assert_eq!(store.capacity(), 8);
    }
}
