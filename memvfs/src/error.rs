use thiserror::Error;

/// Reason a node name was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("name too long")]
    TooLong,
    #[error("name cannot contain '/'")]
    ContainsSeparator,
    /// `.` and `..` are path navigation components, never entries.
    #[error("name is reserved")]
    Reserved,
}

#[derive(Error, Debug)]
pub enum VfsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{reason}")]
    InvalidName { name: String, reason: NameError },
    #[error("'{0}' already exists")]
    AlreadyExists(String),
    /// Carries the path component that could not be found.
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("'{0}' is not a directory")]
    NotADirectory(String),
    #[error("'{0}' is a directory")]
    NotAFile(String),
    #[error("directory '{0}' not empty")]
    NotEmpty(String),
    #[error("not enough disk space ({required} blocks needed, {available} available)")]
    InsufficientSpace { required: usize, available: usize },
    /// The root and the current working directory can not be removed.
    #[error("'{0}' is in use")]
    Busy(String),
    #[error("block device error")]
    Device(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VfsError>;
