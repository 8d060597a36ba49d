use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{VfsError, VfsResult};
use crate::filesystem::FileSystem;

/// Storage device registered with the VFS.
///
/// Only identity and geometry are needed here; block I/O belongs to the
/// filesystem driving the device.
pub trait BlockDevice: Send + Sync {
    /// Stable name, used as the disk map key (e.g. `"vblk0"`).
    fn device_name(&self) -> &str;

    fn block_size(&self) -> usize {
        512
    }

    fn num_blocks(&self) -> u64 {
        0
    }
}

/// RAM-backed block device with a fixed geometry.
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    name: String,
    num_blocks: u64,
}

impl MemoryDevice {
    pub fn new(name: impl Into<String>, num_blocks: u64) -> Self {
        Self {
            name: name.into(),
            num_blocks,
        }
    }
}

impl BlockDevice for MemoryDevice {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn num_blocks(&self) -> u64 {
        self.num_blocks
    }
}

/// A block device plus the filesystem mounted on it, if any.
///
/// Shared as `Arc<Disk>` between the registry's disk map and every
/// subsystem that looked it up; the disk lives until the last handle goes.
pub struct Disk {
    device: Arc<dyn BlockDevice>,
    fs: RwLock<Option<Arc<dyn FileSystem>>>,
}

impl Disk {
    pub fn new(device: Arc<dyn BlockDevice>) -> Self {
        Self {
            device,
            fs: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.device.device_name()
    }

    pub fn device(&self) -> &Arc<dyn BlockDevice> {
        &self.device
    }

    /// Attach a filesystem, replacing any previous one.
    pub fn mount_fs(&self, fs: Arc<dyn FileSystem>) {
        log::info!("Mounting {} filesystem on disk {}", fs.name(), self.name());
        *self.fs.write() = Some(fs);
    }

    pub fn fs_mounted(&self) -> bool {
        self.fs.read().is_some()
    }

    /// The mounted filesystem.
    pub fn fs(&self) -> VfsResult<Arc<dyn FileSystem>> {
        self.fs.read().clone().ok_or_else(|| {
            VfsError::DiskNotMounted(format!(
                "Disk {} does not have a mounted file system",
                self.name()
            ))
        })
    }
}

impl fmt::Debug for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disk")
            .field("name", &self.name())
            .field("blocks", &self.device.num_blocks())
            .field("fs", &self.fs.read().as_ref().map(|fs| fs.name().to_owned()))
            .finish()
    }
}
