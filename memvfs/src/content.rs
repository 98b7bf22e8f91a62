use log::{debug, warn};

use crate::alloc::FreeList;
use crate::error::{Result, VfsError};
use crate::io::{BlockNumber, BlockStorage};
use crate::node::Extent;

/// A block device paired with the allocator that tracks which of its blocks
/// are in use. Maps file content onto chains of blocks.
pub struct Disk<T: BlockStorage> {
    dev: T,
    free: FreeList,
}

impl<T: BlockStorage> Disk<T> {
    /// Takes ownership of the device and treats every block on it as free.
    pub fn new(dev: T) -> Self {
        let free = FreeList::new(dev.block_count());
        Self { dev, free }
    }

    pub fn block_size(&self) -> usize {
        self.dev.block_size()
    }

    pub fn allocator(&self) -> &FreeList {
        &self.free
    }

    pub(crate) fn allocator_mut(&mut self) -> &mut FreeList {
        &mut self.free
    }

    pub fn device(&self) -> &T {
        &self.dev
    }

    /// Returns ownership of the underlying device to the caller.
    pub fn into_device(self) -> T {
        self.dev
    }

    /// Blocks needed to hold `len` bytes.
    pub fn blocks_for(&self, len: usize) -> usize {
        let block_size = self.block_size();
        (len + block_size - 1) / block_size
    }

    /// Replaces the whole content of a file with `bytes`.
    ///
    /// The space check happens before anything is touched. Blocks the file
    /// already holds count as available since they are released before the new
    /// ones are taken, so rewriting a file with content of the same block count
    /// always succeeds, even on a full disk.
    ///
    /// # Errors
    ///
    /// `InsufficientSpace` when the content does not fit; the file keeps its
    /// previous content.
    pub fn write_content(&mut self, extent: &mut Extent, bytes: &[u8]) -> Result<()> {
        let required = self.blocks_for(bytes.len());
        let available = self.free.free_count() + extent.block_count();
        if required > available {
            warn!(
                "write of {} bytes needs {} blocks, {} available",
                bytes.len(),
                required,
                available
            );
            return Err(VfsError::InsufficientSpace {
                required,
                available,
            });
        }

        self.delete_content(extent);
        let mut blocks = Vec::with_capacity(required);
        for chunk in bytes.chunks(self.block_size()) {
            let written = match self.free.allocate() {
                Some(blocknr) => self.dev.write_block(blocknr, chunk).map(|_| blocknr),
                None => {
                    self.free.release_all(blocks);
                    return Err(VfsError::InsufficientSpace {
                        required,
                        available: 0,
                    });
                }
            };
            match written {
                Ok(blocknr) => blocks.push(blocknr),
                Err(e) => {
                    self.free.release_all(blocks);
                    return Err(e.into());
                }
            }
        }

        debug!("stored {} bytes in blocks {:?}", bytes.len(), blocks);
        extent.blocks = blocks;
        extent.size = bytes.len();
        Ok(())
    }

    /// Concatenates the file's blocks in order, cut at the file size.
    pub fn read_content(&self, extent: &Extent) -> Result<Vec<u8>> {
        let block_size = self.block_size();
        let mut content = Vec::with_capacity(extent.size);
        let mut block_buf = vec![0; block_size];
        for &blocknr in extent.blocks.iter() {
            let remaining = extent.size - content.len();
            if remaining == 0 {
                break;
            }
            self.dev.read_block(blocknr, &mut block_buf)?;
            content.extend_from_slice(&block_buf[..remaining.min(block_size)]);
        }
        Ok(content)
    }

    /// Releases every block of the file and resets it to zero length.
    pub fn delete_content(&mut self, extent: &mut Extent) {
        let blocks: Vec<BlockNumber> = std::mem::take(&mut extent.blocks);
        extent.size = 0;
        self.free.release_all(blocks);
    }
}
