use log::{debug, info};

use crate::config::VfsConfig;
use crate::content::Disk;
use crate::error::{Result, VfsError};
use crate::io::{BlockStorage, MemoryBlockStore, MemoryBlockStoreBuilder};
use crate::node::{Namespace, NodeId, NodeKind};
use crate::path;

/// Block accounting of the disk, as reported by `df`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total_blocks: usize,
    pub used_blocks: usize,
    pub free_blocks: usize,
    pub block_size: usize,
}

impl DiskUsage {
    pub fn usage_percent(&self) -> f64 {
        self.used_blocks as f64 / self.total_blocks as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub kind: NodeKind,
    /// Content length in bytes, zero for directories.
    pub size: usize,
    pub block_count: usize,
}

/// An in-memory file system: a block device, the allocator for its blocks,
/// the directory tree and the current working directory.
///
/// Every operation takes a path, absolute or relative to the working
/// directory, and either completes or leaves the file system as it was.
pub struct Vfs<T: BlockStorage = MemoryBlockStore> {
    disk: Disk<T>,
    tree: Namespace,
    cwd: NodeId,
}

impl Vfs<MemoryBlockStore> {
    /// Builds a fresh file system on a zeroed in-memory disk.
    pub fn new(config: VfsConfig) -> Result<Self> {
        config.validate()?;
        let dev = MemoryBlockStoreBuilder::from(&config).build()?;
        info!(
            "initialized disk of {} blocks x {} bytes",
            config.total_blocks, config.block_size
        );
        Ok(Self::with_device(dev, config.max_name_len))
    }
}

impl<T: BlockStorage> Vfs<T> {
    /// Initializes an empty file system onto owned block storage. Any data
    /// already on the device is treated as free space.
    pub fn with_device(dev: T, max_name_len: usize) -> Self {
        let tree = Namespace::new(max_name_len);
        let cwd = tree.root();
        Self {
            disk: Disk::new(dev),
            tree,
            cwd,
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    pub fn namespace(&self) -> &Namespace {
        &self.tree
    }

    pub fn disk(&self) -> &Disk<T> {
        &self.disk
    }

    pub fn resolve(&self, path: &str) -> Result<NodeId> {
        path::resolve(&self.tree, self.cwd, path)
    }

    pub fn absolute_path(&self, node: NodeId) -> String {
        path::absolute_path(&self.tree, node)
    }

    /// Absolute path of the working directory.
    pub fn pwd(&self) -> String {
        self.absolute_path(self.cwd)
    }

    fn add(&mut self, path: &str, kind: NodeKind) -> Result<NodeId> {
        let (parent, name) = path::resolve_parent(&self.tree, self.cwd, path)?;
        let id = self.tree.add(parent, name, kind)?;
        info!("created {:?} {}", kind, self.absolute_path(id));
        Ok(id)
    }

    pub fn mkdir(&mut self, path: &str) -> Result<NodeId> {
        self.add(path, NodeKind::Directory)
    }

    /// Creates an empty file.
    pub fn create(&mut self, path: &str) -> Result<NodeId> {
        self.add(path, NodeKind::File)
    }

    /// Moves the working directory. On failure it stays where it was.
    pub fn cd(&mut self, path: &str) -> Result<NodeId> {
        self.cwd = path::resolve_dir(&self.tree, self.cwd, path)?;
        debug!("working directory is now {}", self.pwd());
        Ok(self.cwd)
    }

    /// Entries of a directory in insertion order. An empty path lists the
    /// working directory.
    pub fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        let dir = path::resolve_dir(&self.tree, self.cwd, path)?;
        Ok(self
            .tree
            .children(dir)
            .filter_map(|id| self.tree.get(id))
            .map(|node| DirEntry {
                name: node.name().to_string(),
                kind: node.kind(),
            })
            .collect())
    }

    /// Removes an empty directory.
    ///
    /// # Errors
    ///
    /// `NotEmpty` while the directory has children, then `Busy` for the root
    /// or the working directory, otherwise the errors of
    /// `Namespace::remove_directory`.
    pub fn rmdir(&mut self, path: &str) -> Result<()> {
        let id = self.resolve(path)?;
        if self.tree.has_children(id) {
            return Err(VfsError::NotEmpty(self.absolute_path(id)));
        }
        if id == self.cwd && self.tree.get(id).map_or(false, |n| n.is_dir()) {
            return Err(VfsError::Busy(self.pwd()));
        }
        let removed = self.absolute_path(id);
        self.tree.remove_directory(id)?;
        info!("removed directory {}", removed);
        Ok(())
    }

    /// Replaces the content of an existing file.
    pub fn write(&mut self, path: &str, bytes: &[u8]) -> Result<NodeId> {
        let id = self.resolve(path)?;
        let extent = self.tree.extent_mut(id)?;
        self.disk.write_content(extent, bytes)?;
        info!(
            "wrote {} bytes to {} in {} blocks",
            bytes.len(),
            path::absolute_path(&self.tree, id),
            self.disk.blocks_for(bytes.len())
        );
        Ok(id)
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let id = self.resolve(path)?;
        self.disk.read_content(self.tree.extent(id)?)
    }

    /// Removes a file and returns its blocks to the free list.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        let id = self.resolve(path)?;
        let removed = self.absolute_path(id);
        let released = self.tree.remove_file(id, self.disk.allocator_mut())?;
        info!("deleted {}, released {} blocks", removed, released);
        Ok(())
    }

    pub fn metadata(&self, path: &str) -> Result<Metadata> {
        let id = self.resolve(path)?;
        let node = self
            .tree
            .get(id)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        let (size, block_count) = node
            .extent()
            .map_or((0, 0), |extent| (extent.size(), extent.block_count()));
        Ok(Metadata {
            kind: node.kind(),
            size,
            block_count,
        })
    }

    pub fn usage(&self) -> DiskUsage {
        let free = self.disk.allocator();
        DiskUsage {
            total_blocks: free.total_blocks(),
            used_blocks: free.used_count(),
            free_blocks: free.free_count(),
            block_size: self.disk.block_size(),
        }
    }

    /// Destroys every file and directory, releasing all blocks, and returns to
    /// the root.
    pub fn teardown(&mut self) {
        self.tree.teardown(self.disk.allocator_mut());
        self.cwd = self.tree.root();
        info!("file system torn down");
    }

    /// Returns ownership of the underlying device to the caller.
    pub fn into_device(self) -> T {
        self.disk.into_device()
    }
}
