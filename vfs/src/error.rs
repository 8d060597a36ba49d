use thiserror::Error;

/// Errors raised by the mount tree, the registry and the filesystem contracts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// The requested type or constness does not match the bound object.
    #[error("bad cast: {0}")]
    BadCast(String),
    /// Typed retrieval on a node that holds no object.
    #[error("not a leaf: {0}")]
    NotLeaf(String),
    /// Child enumeration on a node that is not a container.
    #[error("not a parent: {0}")]
    NotParent(String),
    /// A path, disk or directory entry does not resolve.
    #[error("not found: {0}")]
    NotFound(String),
    /// The mount target's parent is missing, or the mount point is occupied.
    #[error("invalid mount point: {0}")]
    MountpointInvalid(String),
    /// Filesystem access on a disk that has no mounted filesystem.
    #[error("disk not mounted: {0}")]
    DiskNotMounted(String),
    /// The path could not be tokenized (contains `..`).
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// The object bound at this node has been dropped by its owner.
    #[error("dangling object: {0}")]
    Dangling(String),
    /// Another resolution of the same directory entry finished first.
    #[error("already resolved: {0}")]
    AlreadyResolved(String),
}

pub type VfsResult<T> = Result<T, VfsError>;
