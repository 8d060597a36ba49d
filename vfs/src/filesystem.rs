use std::future::Future;
use std::pin::Pin;

use crate::dirent::Dirent;
use crate::error::VfsResult;
use crate::path::Path;

/// A boxed, `Send` future returning a [`VfsResult`].
///
/// Filesystem stats and registry resolutions return this type. A future
/// resolves exactly once; dropping it before completion abandons the
/// operation without invoking anything further.
pub type VfsFuture<T> = Pin<Box<dyn Future<Output = VfsResult<T>> + Send>>;

/// Filesystem mounted on a [`Disk`](crate::Disk).
///
/// The registry only needs directory-entry resolution from a filesystem;
/// byte-level I/O is not part of this contract.
///
/// # Path Contract
///
/// Paths are absolute within the filesystem: the first token names an entry
/// in the filesystem root. The empty path names the root directory itself.
pub trait FileSystem: Send + Sync + 'static {
    /// Short name used in diagnostics (e.g. `"memfs"`).
    fn name(&self) -> &str;

    /// Resolve `path` to a directory entry.
    ///
    /// Fails with [`VfsError::NotFound`](crate::VfsError::NotFound) when
    /// nothing exists at `path`.
    fn stat(&self, path: &Path) -> VfsFuture<Dirent>;

    /// Blocking variant of [`stat`](FileSystem::stat).
    ///
    /// Parks the calling thread until the stat completes. Filesystems with
    /// a cheaper synchronous path should override this.
    fn stat_sync(&self, path: &Path) -> VfsResult<Dirent> {
        pollster::block_on(self.stat(path))
    }
}
