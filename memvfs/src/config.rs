use crate::error::{Result, VfsError};

/// Blocks on the simulated disk unless configured otherwise.
pub const DEFAULT_TOTAL_BLOCKS: usize = 1024;
/// 512 bytes mirrors the sector size of most hard disks.
pub const DEFAULT_BLOCK_SIZE: usize = 512;
pub const DEFAULT_MAX_NAME_LEN: usize = 50;

/// Geometry of the simulated disk and limits of the namespace.
///
/// The disk holds `total_blocks * block_size` bytes. Nothing about the layout
/// is reserved for metadata: every block is available to file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsConfig {
    pub total_blocks: usize,
    pub block_size: usize,
    /// Upper bound, in bytes, on the length of a single file or directory name.
    pub max_name_len: usize,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            total_blocks: DEFAULT_TOTAL_BLOCKS,
            block_size: DEFAULT_BLOCK_SIZE,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

impl VfsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_total_blocks(mut self, blocks: usize) -> Self {
        self.total_blocks = blocks;
        self
    }

    pub fn with_block_size(mut self, bytes: usize) -> Self {
        self.block_size = bytes;
        self
    }

    pub fn with_max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = len;
        self
    }

    /// Total bytes addressable on the disk.
    pub fn capacity(&self) -> usize {
        self.total_blocks * self.block_size
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` when any of the three values is zero or the
    /// disk size overflows `usize`.
    pub fn validate(&self) -> Result<()> {
        if self.total_blocks == 0 {
            return Err(VfsError::InvalidArgument(
                "disk must contain at least one block".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(VfsError::InvalidArgument(
                "block size must be non-zero".to_string(),
            ));
        }
        if self.max_name_len == 0 {
            return Err(VfsError::InvalidArgument(
                "maximum name length must be non-zero".to_string(),
            ));
        }
        if self.total_blocks.checked_mul(self.block_size).is_none() {
            return Err(VfsError::InvalidArgument(format!(
                "{} blocks of {} bytes exceed addressable memory",
                self.total_blocks, self.block_size
            )));
        }
        Ok(())
    }
}
