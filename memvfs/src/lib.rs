//! An in-memory block storage file system.
//!
//! A fixed size simulated disk is divided into equal blocks. Files are chains
//! of blocks handed out by a FIFO free list, and live in a directory tree
//! addressed with slash separated paths.
//!
//! ```
//! use memvfs::{Vfs, VfsConfig};
//!
//! let mut fs = Vfs::new(VfsConfig::default()).unwrap();
//! fs.mkdir("docs").unwrap();
//! fs.create("docs/readme").unwrap();
//! fs.write("/docs/readme", b"hello").unwrap();
//! assert_eq!(fs.read("docs/readme").unwrap(), b"hello");
//! ```

pub mod alloc;
pub mod cmd;
pub mod config;
pub mod content;
mod error;
pub mod fs;
pub mod io;
pub mod node;
pub mod path;

pub use crate::cmd::{Command, Shell};
pub use crate::config::VfsConfig;
pub use crate::error::{NameError, Result, VfsError};
pub use crate::fs::{DirEntry, DiskUsage, Metadata, Vfs};
pub use crate::node::{NodeId, NodeKind};
