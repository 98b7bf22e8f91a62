/// The block number to access ranging from 0 (the first block) to n - 1 (the last
/// block) where n is number of blocks available.
pub type BlockNumber = usize;

/// Raw fixed-size block access. Blocks carry no metadata of their own; which
/// block belongs to which file is tracked entirely outside the device.
pub trait BlockStorage {
    /// Size in bytes of every block on the device.
    fn block_size(&self) -> usize;
    /// The total number of blocks available on the device.
    fn block_count(&self) -> usize;
    /// Reads disk block number into the first `block_size` bytes of `buf`.
    ///
    /// # Errors
    ///
    /// Attempting to read a block out of range, or into a buffer smaller than a
    /// block, will return an error.
    fn read_block(&self, blocknr: BlockNumber, buf: &mut [u8]) -> std::io::Result<()>;
    /// Writes provided buffer into the specified block number. A buffer shorter
    /// than a block is written at the start of the block and the remainder of
    /// the block is zero filled.
    ///
    /// # Errors
    ///
    /// Attempting to write a block out of range, or a buffer larger than a
    /// block, will return an error.
    fn write_block(&mut self, blocknr: BlockNumber, buf: &[u8]) -> std::io::Result<()>;
}
