use std::fmt;
use std::sync::Arc;

use crate::error::{VfsError, VfsResult};
use crate::filesystem::{FileSystem, VfsFuture};
use crate::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirentKind {
    File,
    Directory,
    /// The sentinel returned when no real entry is available.
    Invalid,
}

/// A resolved directory entry.
///
/// Remembers the filesystem it came from and its absolute path there, so a
/// dirent mounted in the tree can answer stats for any path beneath it.
#[derive(Clone)]
pub struct Dirent {
    fs: Option<Arc<dyn FileSystem>>,
    kind: DirentKind,
    path: Path,
    size: u64,
}

impl Dirent {
    pub fn new(fs: Arc<dyn FileSystem>, kind: DirentKind, path: Path, size: u64) -> Self {
        Self {
            fs: Some(fs),
            kind,
            path,
            size,
        }
    }

    /// The invalid sentinel. It has no filesystem and every stat through it
    /// fails with [`VfsError::NotFound`].
    pub fn invalid() -> Self {
        Self {
            fs: None,
            kind: DirentKind::Invalid,
            path: Path::root(),
            size: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.kind != DirentKind::Invalid
    }

    pub fn is_file(&self) -> bool {
        self.kind == DirentKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == DirentKind::Directory
    }

    pub fn kind(&self) -> DirentKind {
        self.kind
    }

    /// Last path token, or `/` for a filesystem root.
    pub fn name(&self) -> &str {
        self.path.back().unwrap_or("/")
    }

    /// Absolute path within the owning filesystem.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn fs_name(&self) -> Option<&str> {
        self.fs.as_deref().map(|fs| fs.name())
    }

    /// Stat `suffix` relative to this entry.
    pub fn stat(&self, suffix: &Path) -> VfsFuture<Dirent> {
        match &self.fs {
            Some(fs) => fs.stat(&self.path.join(suffix)),
            None => {
                let err = self.invalid_stat(suffix);
                Box::pin(async move { Err(err) })
            }
        }
    }

    /// Blocking variant of [`stat`](Dirent::stat).
    pub fn stat_sync(&self, suffix: &Path) -> VfsResult<Dirent> {
        match &self.fs {
            Some(fs) => fs.stat_sync(&self.path.join(suffix)),
            None => Err(self.invalid_stat(suffix)),
        }
    }

    fn invalid_stat(&self, suffix: &Path) -> VfsError {
        VfsError::NotFound(format!("{suffix} (stat through invalid dirent)"))
    }
}

impl fmt::Debug for Dirent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dirent")
            .field("fs", &self.fs_name())
            .field("kind", &self.kind)
            .field("path", &self.path.to_string())
            .field("size", &self.size)
            .finish()
    }
}
