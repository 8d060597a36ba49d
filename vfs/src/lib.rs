//! Typed object namespace for the Kestrel unikernel.
//!
//! A single tree of path-like names under which subsystems publish
//! arbitrary objects (services, counters, disks, directory entries) so that
//! other subsystems can discover them without compile-time coupling.
//!
//! # Architecture
//!
//! - [`Entry`]: a tree node. Parents own their children; a node may also
//!   hold a [`Binding`], a type-tagged, non-owning reference to an object
//!   owned elsewhere.
//! - [`Registry`]: the namespace authority. Owns the root entry, a map of
//!   registered [`Disk`]s and a cache of resolved [`Dirent`]s, and is the
//!   only way to mutate the tree.
//!
//! Retrieval is checked at runtime against the exact published type:
//!
//! ```ignore
//! let counter = Arc::new(RwLock::new(0i32));
//! registry.mount_mut("/svc/counter", &counter, "Request counter")?;
//!
//! assert_eq!(*registry.get::<i32>("/svc/counter")?.read(), 0);
//! assert!(registry.get::<u64>("/svc/counter").is_err()); // BadCast
//! ```
//!
//! # Disks and directory entries
//!
//! A [`BlockDevice`] mounted through [`Registry::mount_device`] becomes a
//! shared [`Disk`]. Once a [`FileSystem`] is attached to it,
//! [`Registry::mount_remote`] resolves a path on that filesystem and mounts
//! the resulting directory entry. Stats below that mount point are answered
//! by the entry itself:
//!
//! ```ignore
//! registry.mount_remote("/etc", "vblk0", "/etc", "Config").await?;
//! let hosts = registry.stat("/etc/net/hosts")?.await?; // stats "net/hosts" on vblk0
//! ```
//!
//! Asynchronous operations return a [`VfsFuture`]. Futures from
//! [`MemoryFs`] are ready on the first poll and can be driven with
//! [`poll_now`]; others need an executor.

mod config;
mod device;
mod dirent;
mod entry;
mod error;
mod filesystem;
mod memory;
mod object;
mod path;
mod poll;
mod registry;

pub use config::{DuplicateDirentPolicy, RegistryConfig};
pub use device::{BlockDevice, Disk, MemoryDevice};
pub use dirent::{Dirent, DirentKind};
pub use entry::{Entry, EntryInfo, WalkMode};
pub use error::{VfsError, VfsResult};
pub use filesystem::{FileSystem, VfsFuture};
pub use memory::MemoryFs;
pub use object::{Binding, ObjectGuard, ObjectRef};
pub use path::Path;
pub use poll::poll_now;
pub use registry::Registry;
