use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry as Slot;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};

use crate::config::{DuplicateDirentPolicy, RegistryConfig};
use crate::device::{BlockDevice, Disk};
use crate::dirent::Dirent;
use crate::entry::{Entry, EntryInfo, WalkMode};
use crate::error::{VfsError, VfsResult};
use crate::filesystem::VfsFuture;
use crate::object::{Binding, ObjectRef};
use crate::path::Path;

const BANNER_WIDTH: usize = 60;

/// `(disk name, path within the disk)`.
type DirentKey = (String, String);

/// Namespace authority: the mount tree, the disk map and the dirent cache.
///
/// Subsystems publish objects under paths and others look them up by path
/// and type, without compile-time coupling between the two. Disks register
/// here, and directory entries resolved from their filesystems are cached
/// and can be mounted so that one node answers stats for a whole subtree.
///
/// `Clone` is cheap (Arc internals) and every clone is the same registry.
/// Each of the three structures has its own lock, held only for the
/// synchronous part of an operation and never across an `.await`.
///
/// # Example
///
/// ```ignore
/// let registry = Registry::new();
///
/// let counter = Arc::new(RwLock::new(0i32));
/// registry.mount_mut("/svc/counter", &counter, "Request counter")?;
/// *registry.get_mut::<i32>("/svc/counter")?.write() += 1;
///
/// let disk = registry.mount_device("/dev/vblk0", device, "Boot disk")?;
/// disk.mount_fs(Arc::new(fs));
/// registry.mount_remote("/etc", "vblk0", "/etc", "Config").await?;
/// let hosts = registry.stat("/etc/hosts")?.await?;
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    config: RegistryConfig,
    root: Mutex<Entry>,
    disks: Mutex<HashMap<String, Arc<Disk>>>,
    dirents: Mutex<HashMap<DirentKey, Arc<Dirent>>>,
}

impl Registry {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let root = Entry::directory("/", config.root_description.clone());
        Self {
            inner: Arc::new(RegistryInner {
                config,
                root: Mutex::new(root),
                disks: Mutex::new(HashMap::new()),
                dirents: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The process-wide registry, created on first use and never torn down.
    ///
    /// Prefer passing a [`Registry`] handle where possible; this exists for
    /// subsystems that are initialized before any handle can reach them.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Publish read-only access to `object` at `path`, creating missing
    /// parent directories.
    pub fn mount<T: Any + Send + Sync>(
        &self,
        path: &str,
        object: &Arc<T>,
        description: &str,
    ) -> VfsResult<()> {
        self.mount_binding(path, Binding::shared(object), description, true)
    }

    /// Publish read-write access to the value behind `object` at `path`,
    /// creating missing parent directories.
    pub fn mount_mut<T: Any + Send + Sync>(
        &self,
        path: &str,
        object: &Arc<RwLock<T>>,
        description: &str,
    ) -> VfsResult<()> {
        self.mount_binding(path, Binding::locked(object), description, true)
    }

    /// Mount `binding` at `path`.
    ///
    /// With `create_path` unset the parent must already exist. Fails with
    /// [`VfsError::MountpointInvalid`] if the parent is missing or `path`
    /// is already taken.
    pub fn mount_binding(
        &self,
        path: &str,
        binding: Binding,
        description: &str,
        create_path: bool,
    ) -> VfsResult<()> {
        self.mount_at(Path::parse(path)?, binding, description, create_path)
    }

    /// Register `device` as a disk and mount the disk handle at `path`.
    ///
    /// This is the only way a disk becomes visible in the tree. The tree
    /// refers to the handle stored in the disk map; the returned handle is
    /// the same disk.
    pub fn mount_device(
        &self,
        path: &str,
        device: Arc<dyn BlockDevice>,
        description: &str,
    ) -> VfsResult<Arc<Disk>> {
        let path = Path::parse(path)?;
        log::info!("Creating Disk object for {}", device.device_name());
        let disk = self.insert_disk(device);
        self.mount_at(path, Binding::shared(&disk), description, true)?;
        Ok(disk)
    }

    /// Resolve `remote` on `disk` and mount the resulting directory entry at
    /// `local`.
    ///
    /// Resolution failures, synchronous or not, are reported through the
    /// returned future and nothing is mounted. If a concurrent resolution
    /// of the same entry was cached first, that canonical entry is mounted.
    pub fn mount_remote(
        &self,
        local: &str,
        disk: &str,
        remote: &str,
        description: &str,
    ) -> VfsFuture<()> {
        let prepared = Path::parse(local).and_then(|local| {
            let remote = Path::parse(remote)?;
            log::info!("Creating mountpoint for {disk}::{remote} on {local}");
            let pending = self.insert_dirent_at(disk, &remote)?;
            Ok((local, remote, pending))
        });

        let registry = self.clone();
        let disk = disk.to_owned();
        let description = description.to_owned();
        Box::pin(async move {
            let (local, remote, pending) = prepared?;
            let mut dirent = pending.await?;
            if !dirent.is_valid() {
                dirent = registry.cached_dirent_at(&disk, &remote).ok_or_else(|| {
                    VfsError::NotFound(format!("Dirent {disk}::{remote}"))
                })?;
            }
            registry.mount_at(local, Binding::shared(&dirent), &description, true)
        })
    }

    /// Fetch the object of type `T` mounted at `path`.
    ///
    /// Objects published with [`mount`](Registry::mount) and
    /// [`mount_mut`](Registry::mount_mut) can both be read this way.
    pub fn get<T: Any + Send + Sync>(&self, path: &str) -> VfsResult<ObjectRef<T>> {
        let mut path = Path::parse(path)?;
        let shown = path.to_string();
        let mut root = self.inner.root.lock();
        root.walk(&mut path, WalkMode::LOOKUP)
            .ok_or_else(|| not_found(&shown))?
            .get::<T>()
    }

    /// Fetch write access to the object of type `T` mounted at `path`.
    ///
    /// Fails with [`VfsError::BadCast`] if it was published read-only.
    pub fn get_mut<T: Any + Send + Sync>(&self, path: &str) -> VfsResult<Arc<RwLock<T>>> {
        let mut path = Path::parse(path)?;
        let shown = path.to_string();
        let mut root = self.inner.root.lock();
        root.walk(&mut path, WalkMode::LOOKUP)
            .ok_or_else(|| not_found(&shown))?
            .get_mut::<T>()
    }

    /// Stat `path` through the directory entry mounted on it.
    ///
    /// The walk stops at the deepest mounted [`Dirent`] and the unresolved
    /// rest of the path is handed to that entry, so one mounted entry
    /// answers for everything beneath it.
    pub fn stat(&self, path: &str) -> VfsResult<VfsFuture<Dirent>> {
        let (dirent, suffix) = self.resolve_dirent(path)?;
        let pending = dirent.read().stat(&suffix);
        Ok(pending)
    }

    /// Blocking variant of [`stat`](Registry::stat).
    pub fn stat_sync(&self, path: &str) -> VfsResult<Dirent> {
        let (dirent, suffix) = self.resolve_dirent(path)?;
        dirent.read().stat_sync(&suffix)
    }

    /// Register `device` in the disk map under its device name.
    ///
    /// A disk already registered under that name is replaced.
    pub fn insert_disk(&self, device: Arc<dyn BlockDevice>) -> Arc<Disk> {
        let disk = Arc::new(Disk::new(device));
        let name = disk.name().to_owned();
        if self
            .inner
            .disks
            .lock()
            .insert(name.clone(), Arc::clone(&disk))
            .is_some()
        {
            log::warn!("Disk {name} was already registered, replacing it");
        }
        disk
    }

    pub fn disk(&self, name: &str) -> Option<Arc<Disk>> {
        self.inner.disks.lock().get(name).cloned()
    }

    /// Forget a disk. Mounted nodes and cached dirents are left untouched.
    pub fn remove_disk(&self, name: &str) -> Option<Arc<Disk>> {
        self.inner.disks.lock().remove(name)
    }

    /// Names of the registered disks, sorted.
    pub fn disk_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.disks.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve `path` on the filesystem of `disk` and cache the result.
    ///
    /// Fails immediately with [`VfsError::NotFound`] if the disk is unknown,
    /// or [`VfsError::DiskNotMounted`] if it has no filesystem; the
    /// filesystem is not touched in either case. Otherwise the returned
    /// future yields the cached entry once the filesystem stat completes.
    /// A stat failure becomes [`VfsError::NotFound`].
    ///
    /// The first resolution of a `(disk, path)` pair is cached and never
    /// replaced. Later resolutions of the same pair are answered according
    /// to [`RegistryConfig::duplicate_dirent`].
    pub fn insert_dirent(&self, disk: &str, path: &str) -> VfsResult<VfsFuture<Arc<Dirent>>> {
        self.insert_dirent_at(disk, &Path::parse(path)?)
    }

    /// The cached entry for `path` on `disk`, if one was resolved.
    ///
    /// Fails with [`VfsError::InvalidPath`] if `path` does not parse.
    pub fn cached_dirent(&self, disk: &str, path: &str) -> VfsResult<Option<Arc<Dirent>>> {
        Ok(self.cached_dirent_at(disk, &Path::parse(path)?))
    }

    /// Names of the children of the node at `path`, in mount order.
    pub fn list(&self, path: &str) -> VfsResult<Vec<String>> {
        let mut path = Path::parse(path)?;
        let shown = path.to_string();
        let mut root = self.inner.root.lock();
        let node = root
            .walk(&mut path, WalkMode::LOOKUP)
            .ok_or_else(|| not_found(&shown))?;

        if let Some(binding) = node.binding()
            && node.child_count() == 0
        {
            return Err(VfsError::NotParent(format!(
                "{shown} holds a {} and has no children",
                binding.type_name()
            )));
        }
        Ok(node.children().map(|child| child.name().to_owned()).collect())
    }

    /// Metadata of the node at `path`.
    pub fn describe(&self, path: &str) -> VfsResult<EntryInfo> {
        let mut path = Path::parse(path)?;
        let shown = path.to_string();
        let mut root = self.inner.root.lock();
        root.walk(&mut path, WalkMode::LOOKUP)
            .map(|node| node.info())
            .ok_or_else(|| not_found(&shown))
    }

    /// Run `f` with read access to the root of the tree.
    pub fn with_root<R>(&self, f: impl FnOnce(&Entry) -> R) -> R {
        f(&self.inner.root.lock())
    }

    /// The mount tree rendered under a "Mount points" banner.
    pub fn tree(&self) -> String {
        let root = self.inner.root.lock();
        format!(
            "{}\n{:^BANNER_WIDTH$}\n{}\n{root}{}\n",
            "=".repeat(BANNER_WIDTH),
            "Mount points",
            "-".repeat(BANNER_WIDTH),
            "_".repeat(BANNER_WIDTH),
        )
    }

    /// Log [`tree`](Registry::tree) at info level, one line per record.
    pub fn log_tree(&self) {
        for line in self.tree().lines() {
            log::info!("{line}");
        }
    }

    fn mount_at(
        &self,
        path: Path,
        binding: Binding,
        description: &str,
        create_path: bool,
    ) -> VfsResult<()> {
        log::info!("Mounting {} on {path}", binding.type_name());
        self.inner
            .root
            .lock()
            .mount(path, binding, description, create_path)
    }

    fn resolve_dirent(&self, path: &str) -> VfsResult<(ObjectRef<Dirent>, Path)> {
        let mut remaining = Path::parse(path)?;
        let shown = remaining.to_string();
        let mut root = self.inner.root.lock();
        let node = root
            .walk(&mut remaining, WalkMode::PARTIAL)
            .ok_or_else(|| not_found(&shown))?;
        Ok((node.get::<Dirent>()?, remaining))
    }

    fn insert_dirent_at(&self, disk_name: &str, path: &Path) -> VfsResult<VfsFuture<Arc<Dirent>>> {
        let disk = self
            .disk(disk_name)
            .ok_or_else(|| VfsError::NotFound(format!("Disk {disk_name} is not mounted")))?;
        let pending = disk.fs()?.stat(path);

        let registry = self.clone();
        let key = (disk_name.to_owned(), path.to_string());
        Ok(Box::pin(async move {
            match pending.await {
                Ok(dirent) => registry.cache_dirent(key, dirent),
                Err(err) => {
                    log::debug!("Stat of {}::{} failed: {err}", key.0, key.1);
                    Err(VfsError::NotFound(format!("Dirent {}::{}", key.0, key.1)))
                }
            }
        }))
    }

    fn cached_dirent_at(&self, disk: &str, path: &Path) -> Option<Arc<Dirent>> {
        let key = (disk.to_owned(), path.to_string());
        self.inner.dirents.lock().get(&key).cloned()
    }

    fn cache_dirent(&self, key: DirentKey, dirent: Dirent) -> VfsResult<Arc<Dirent>> {
        let mut cache = self.inner.dirents.lock();
        match cache.entry(key) {
            Slot::Vacant(slot) => {
                log::debug!("Caching dirent {}::{}", slot.key().0, slot.key().1);
                Ok(Arc::clone(slot.insert(Arc::new(dirent))))
            }
            Slot::Occupied(slot) => {
                let (disk, path) = slot.key();
                log::warn!("Dirent {disk}::{path} was resolved twice, keeping the first");
                match self.inner.config.duplicate_dirent {
                    DuplicateDirentPolicy::Sentinel => Ok(Arc::new(Dirent::invalid())),
                    DuplicateDirentPolicy::Shared => Ok(Arc::clone(slot.get())),
                    DuplicateDirentPolicy::Reject => Err(VfsError::AlreadyResolved(format!(
                        "Dirent {disk}::{path}"
                    ))),
                }
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("disks", &self.disk_names())
            .field("dirents", &self.inner.dirents.lock().len())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn not_found(path: &str) -> VfsError {
    VfsError::NotFound(format!("Path {path} does not exist"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDevice, MemoryFs, poll_now};

    fn registry_with_disk() -> (Registry, MemoryFs) {
        let registry = Registry::new();
        let fs = MemoryFs::new("memfs");
        fs.insert("etc/hosts", 64).unwrap();
        fs.insert("dir/sub/file.txt", 12).unwrap();
        let disk = registry
            .mount_device("/dev/disk0", Arc::new(MemoryDevice::new("disk0", 32)), "disk")
            .unwrap();
        disk.mount_fs(Arc::new(fs.clone()));
        (registry, fs)
    }

    #[test]
    fn get_returns_the_published_object() {
        let registry = Registry::new();
        let hostname = Arc::new(String::from("kestrel"));
        registry.mount("/etc/hostname", &hostname, "Host name").unwrap();

        let object = registry.get::<String>("/etc/hostname").unwrap();
        assert!(object.points_to(&hostname));
        assert!(matches!(
            registry.get::<u32>("/etc/hostname"),
            Err(VfsError::BadCast(_))
        ));
    }

    #[test]
    fn counter_reads_see_owner_writes() {
        let registry = Registry::new();
        let counter = Arc::new(RwLock::new(0i32));
        registry.mount_mut("/svc/counter", &counter, "Request counter").unwrap();

        assert_eq!(*registry.get::<i32>("/svc/counter").unwrap().read(), 0);
        *counter.write() = 5;
        assert_eq!(*registry.get::<i32>("/svc/counter").unwrap().read(), 5);
    }

    #[test]
    fn objects_cannot_hold_mounts() {
        let registry = Registry::new();
        let value = Arc::new(1u32);
        registry.mount("/svc/n", &value, "n").unwrap();

        let err = registry.mount("/svc/n/inner", &value, "inner").unwrap_err();
        assert!(matches!(err, VfsError::MountpointInvalid(_)));
        let err = registry
            .mount_binding("/svc/n/inner", Binding::shared(&value), "inner", false)
            .unwrap_err();
        assert!(matches!(err, VfsError::MountpointInvalid(_)));
        assert!(matches!(registry.list("/svc/n"), Err(VfsError::NotParent(_))));
    }

    #[test]
    fn cached_dirent_rejects_bad_paths() {
        let (registry, _) = registry_with_disk();
        assert!(matches!(
            registry.cached_dirent("disk0", "/etc/../boot"),
            Err(VfsError::InvalidPath(_))
        ));
        assert!(registry.cached_dirent("disk0", "/etc").unwrap().is_none());
    }

    #[test]
    fn missing_path_is_not_found() {
        let registry = Registry::new();
        let err = registry.get::<u32>("/nope").err().unwrap();
        assert_eq!(err, VfsError::NotFound("Path /nope does not exist".into()));
    }

    #[test]
    fn directory_is_not_a_leaf() {
        let registry = Registry::new();
        registry.mount("/svc/a", &Arc::new(1u8), "a").unwrap();
        assert!(matches!(
            registry.get::<u8>("/svc"),
            Err(VfsError::NotLeaf(_))
        ));
    }

    #[test]
    fn const_objects_refuse_write_access() {
        let registry = Registry::new();
        let value = Arc::new(RwLock::new(1u8));
        registry.mount("/svc/locked", &value, "bound read-only").unwrap();

        // Published read-only, so only the exact type `RwLock<u8>` matches.
        assert!(registry.get::<RwLock<u8>>("/svc/locked").is_ok());
        assert!(matches!(
            registry.get_mut::<RwLock<u8>>("/svc/locked"),
            Err(VfsError::BadCast(_))
        ));
    }

    #[test]
    fn mount_without_create_path() {
        let registry = Registry::new();
        let obj = Arc::new(1u8);

        let err = registry
            .mount_binding("/missing/leaf", Binding::shared(&obj), "desc", false)
            .unwrap_err();
        assert!(matches!(err, VfsError::MountpointInvalid(_)));

        registry.mount("/present/other", &obj, "other").unwrap();
        registry
            .mount_binding("/present/leaf", Binding::shared(&obj), "desc", false)
            .unwrap();
        assert_eq!(registry.list("/present").unwrap(), vec!["other", "leaf"]);
    }

    #[test]
    fn mount_device_registers_and_mounts_the_disk() {
        let (registry, _) = registry_with_disk();

        let disk = registry.get::<Disk>("/dev/disk0").unwrap();
        assert!(disk.read().fs_mounted());
        assert!(disk.points_to(&registry.disk("disk0").unwrap()));
        assert_eq!(registry.disk_names(), vec!["disk0"]);
    }

    #[test]
    fn insert_disk_replaces_same_name() {
        let registry = Registry::new();
        let first = registry.insert_disk(Arc::new(MemoryDevice::new("vblk0", 1)));
        let second = registry.insert_disk(Arc::new(MemoryDevice::new("vblk0", 2)));

        let stored = registry.disk("vblk0").unwrap();
        assert!(Arc::ptr_eq(&stored, &second));
        assert!(!Arc::ptr_eq(&stored, &first));
    }

    #[test]
    fn insert_dirent_fails_early_for_unknown_disk() {
        let registry = Registry::new();
        let err = registry.insert_dirent("disk9", "/etc").err().unwrap();
        assert_eq!(err, VfsError::NotFound("Disk disk9 is not mounted".into()));
    }

    #[test]
    fn insert_dirent_fails_early_without_filesystem() {
        let registry = Registry::new();
        registry.insert_disk(Arc::new(MemoryDevice::new("raw0", 1)));
        assert!(matches!(
            registry.insert_dirent("raw0", "/etc"),
            Err(VfsError::DiskNotMounted(_))
        ));
    }

    #[test]
    fn insert_dirent_caches_first_resolution() {
        let (registry, _) = registry_with_disk();

        let first = poll_now(registry.insert_dirent("disk0", "/etc").unwrap()).unwrap();
        assert!(first.is_dir());
        let cached = registry.cached_dirent("disk0", "etc").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        // Sequential re-resolution also loses against the cached entry.
        let again = poll_now(registry.insert_dirent("disk0", "/etc").unwrap()).unwrap();
        assert!(!again.is_valid());
        assert!(Arc::ptr_eq(
            &registry.cached_dirent("disk0", "/etc").unwrap().unwrap(),
            &first
        ));
    }

    #[test]
    fn insert_dirent_stat_failure_is_not_found() {
        let (registry, _) = registry_with_disk();
        let err = poll_now(registry.insert_dirent("disk0", "/missing").unwrap()).unwrap_err();
        assert_eq!(err, VfsError::NotFound("Dirent disk0::/missing".into()));
        assert!(registry.cached_dirent("disk0", "/missing").unwrap().is_none());
    }

    #[test]
    fn shared_policy_hands_out_the_cached_entry() {
        let registry = Registry::with_config(RegistryConfig {
            duplicate_dirent: DuplicateDirentPolicy::Shared,
            ..RegistryConfig::default()
        });
        let fs = MemoryFs::new("memfs");
        fs.create_dir("etc").unwrap();
        registry
            .insert_disk(Arc::new(MemoryDevice::new("disk0", 1)))
            .mount_fs(Arc::new(fs));

        let first = poll_now(registry.insert_dirent("disk0", "/etc").unwrap()).unwrap();
        let second = poll_now(registry.insert_dirent("disk0", "/etc").unwrap()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reject_policy_fails_the_loser() {
        let registry = Registry::with_config(RegistryConfig {
            duplicate_dirent: DuplicateDirentPolicy::Reject,
            ..RegistryConfig::default()
        });
        let fs = MemoryFs::new("memfs");
        fs.create_dir("etc").unwrap();
        registry
            .insert_disk(Arc::new(MemoryDevice::new("disk0", 1)))
            .mount_fs(Arc::new(fs));

        poll_now(registry.insert_dirent("disk0", "/etc").unwrap()).unwrap();
        assert!(matches!(
            poll_now(registry.insert_dirent("disk0", "/etc").unwrap()),
            Err(VfsError::AlreadyResolved(_))
        ));
    }

    #[test]
    fn mount_remote_then_stat_below_it() {
        let (registry, _) = registry_with_disk();

        poll_now(registry.mount_remote("/mnt/dir", "disk0", "/dir", "Data")).unwrap();

        let file = poll_now(registry.stat("/mnt/dir/sub/file.txt").unwrap()).unwrap();
        assert!(file.is_file());
        assert_eq!(file.size(), 12);
        assert_eq!(file.path().to_string(), "/dir/sub/file.txt");

        let sync = registry.stat_sync("/mnt/dir/sub").unwrap();
        assert!(sync.is_dir());

        let info = registry.describe("/mnt/dir").unwrap();
        assert_eq!(info.description, "Data");
        assert_eq!(info.type_name, Some(std::any::type_name::<Dirent>()));
        assert!(info.is_const);
    }

    #[test]
    fn mount_remote_reports_resolution_errors() {
        let (registry, _) = registry_with_disk();

        let err = poll_now(registry.mount_remote("/mnt/x", "disk0", "/missing", "x")).unwrap_err();
        assert!(matches!(err, VfsError::NotFound(_)));
        let err = poll_now(registry.mount_remote("/mnt/x", "nodisk", "/dir", "x")).unwrap_err();
        assert!(matches!(err, VfsError::NotFound(_)));

        // Nothing was mounted.
        assert!(registry.describe("/mnt").is_err());
    }

    #[test]
    fn remounting_a_resolved_entry_uses_the_cached_one() {
        let (registry, _) = registry_with_disk();
        poll_now(registry.mount_remote("/a", "disk0", "/etc", "first")).unwrap();
        poll_now(registry.mount_remote("/b", "disk0", "/etc", "second")).unwrap();

        let a = registry.get::<Dirent>("/a").unwrap();
        let b = registry.get::<Dirent>("/b").unwrap();
        assert!(a.points_to(&registry.cached_dirent("disk0", "/etc").unwrap().unwrap()));
        assert!(b.points_to(&registry.cached_dirent("disk0", "/etc").unwrap().unwrap()));
    }

    #[test]
    fn stat_needs_a_mounted_dirent() {
        let registry = Registry::new();
        registry.mount("/svc/value", &Arc::new(1u8), "value").unwrap();

        assert!(matches!(
            registry.stat("/nothing/here"),
            Err(VfsError::NotFound(_))
        ));
        assert!(matches!(
            registry.stat_sync("/svc/value"),
            Err(VfsError::BadCast(_))
        ));
        assert!(matches!(registry.stat("/svc"), Err(VfsError::NotLeaf(_))));
    }

    #[test]
    fn list_and_not_parent() {
        let registry = Registry::new();
        registry.mount("/svc/a", &Arc::new(1u8), "a").unwrap();
        registry.mount("/svc/b", &Arc::new(2u8), "b").unwrap();

        assert_eq!(registry.list("/").unwrap(), vec!["svc"]);
        assert_eq!(registry.list("/svc").unwrap(), vec!["a", "b"]);
        assert!(matches!(
            registry.list("/svc/a"),
            Err(VfsError::NotParent(_))
        ));
        assert!(matches!(registry.list("/other"), Err(VfsError::NotFound(_))));
    }

    #[test]
    fn dropped_objects_dangle() {
        let registry = Registry::new();
        let value = Arc::new(3u16);
        registry.mount("/svc/value", &value, "value").unwrap();
        drop(value);

        assert!(matches!(
            registry.get::<u16>("/svc/value"),
            Err(VfsError::Dangling(_))
        ));
    }

    #[test]
    fn tree_has_banner() {
        let registry = Registry::new();
        registry.mount("/svc/value", &Arc::new(3u16), "value").unwrap();

        let tree = registry.tree();
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[0], "=".repeat(BANNER_WIDTH));
        assert_eq!(lines[1].trim(), "Mount points");
        assert_eq!(lines[3], "-- /");
        assert_eq!(lines[4], "   `-- svc");
        assert_eq!(lines[5], "       `-- value (u16)");
        assert_eq!(lines[6], "_".repeat(BANNER_WIDTH));
    }

    #[test]
    fn root_description_is_configurable() {
        let registry = Registry::with_config(RegistryConfig {
            root_description: "Kestrel root".into(),
            ..RegistryConfig::default()
        });
        assert_eq!(registry.describe("/").unwrap().description, "Kestrel root");
        registry.with_root(|root| assert_eq!(root.name(), "/"));
    }

    #[test]
    fn global_registry_is_a_singleton() {
        let value = Arc::new(5u64);
        Registry::global()
            .mount("/test/global_registry_is_a_singleton", &value, "v")
            .unwrap();
        let seen = Registry::global()
            .get::<u64>("/test/global_registry_is_a_singleton")
            .unwrap();
        assert!(seen.points_to(&value));
    }
}
