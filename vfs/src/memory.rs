use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dirent::{Dirent, DirentKind};
use crate::error::{VfsError, VfsResult};
use crate::filesystem::{FileSystem, VfsFuture};
use crate::path::Path;

/// In-memory filesystem for tests, early boot and embedded images.
///
/// Tracks entries and their sizes only; it stores no file contents.
/// Directories are implicit: they exist whenever a stored path contains
/// that directory prefix. Empty directories can be added explicitly with
/// [`create_dir`](MemoryFs::create_dir).
///
/// Clone is cheap and clones share the same entries, so the filesystem
/// stays mutable after it has been attached to a disk.
///
/// # Example
///
/// ```ignore
/// let fs = MemoryFs::new("initfs");
/// fs.insert("etc/hosts", 128)?;
/// fs.create_dir("tmp")?;
/// disk.mount_fs(Arc::new(fs));
/// ```
#[derive(Clone)]
pub struct MemoryFs {
    name: Arc<str>,
    entries: Arc<RwLock<Entries>>,
}

#[derive(Default)]
struct Entries {
    files: HashMap<String, u64>,
    dirs: HashSet<String>,
}

impl Entries {
    fn kind_of(&self, key: &str) -> Option<(DirentKind, u64)> {
        if key.is_empty() {
            return Some((DirentKind::Directory, 0));
        }
        if let Some(size) = self.files.get(key) {
            return Some((DirentKind::File, *size));
        }
        let prefix = format!("{key}/");
        let is_dir = self.dirs.contains(key)
            || self
                .files
                .keys()
                .chain(self.dirs.iter())
                .any(|k| k.starts_with(&prefix));
        is_dir.then_some((DirentKind::Directory, 0))
    }
}

impl MemoryFs {
    /// Create an empty filesystem.
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            entries: Arc::new(RwLock::new(Entries::default())),
        }
    }

    /// Add a file of `size` bytes at `path`, replacing any file already there.
    pub fn insert(&self, path: &str, size: u64) -> VfsResult<()> {
        let key = Self::key(path)?;
        self.entries.write().files.insert(key, size);
        Ok(())
    }

    /// Add an explicit, possibly empty, directory.
    pub fn create_dir(&self, path: &str) -> VfsResult<()> {
        let key = Self::key(path)?;
        self.entries.write().dirs.insert(key);
        Ok(())
    }

    /// Remove a file or explicit directory. Returns whether anything was removed.
    pub fn remove(&self, path: &str) -> VfsResult<bool> {
        let key = Self::key(path)?;
        let mut entries = self.entries.write();
        let file = entries.files.remove(&key).is_some();
        let dir = entries.dirs.remove(&key);
        Ok(file || dir)
    }

    fn key(path: &str) -> VfsResult<String> {
        let path = Path::parse(path)?;
        if path.is_empty() {
            return Err(VfsError::InvalidPath("the root cannot be replaced".into()));
        }
        Ok(path.to_relative_string())
    }

    fn resolve(&self, path: &Path) -> VfsResult<Dirent> {
        let found = self.entries.read().kind_of(&path.to_relative_string());
        match found {
            Some((kind, size)) => {
                let fs: Arc<dyn FileSystem> = Arc::new(self.clone());
                Ok(Dirent::new(fs, kind, path.clone(), size))
            }
            None => Err(VfsError::NotFound(format!("{}::{path}", self.name))),
        }
    }
}

impl FileSystem for MemoryFs {
    fn name(&self) -> &str {
        &self.name
    }

    fn stat(&self, path: &Path) -> VfsFuture<Dirent> {
        let fs = self.clone();
        let path = path.clone();
        Box::pin(async move { fs.resolve(&path) })
    }

    fn stat_sync(&self, path: &Path) -> VfsResult<Dirent> {
        self.resolve(path)
    }
}
