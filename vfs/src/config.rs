/// What a dirent resolution receives when another resolution of the same
/// `(disk, path)` was cached first.
///
/// The first cached entry always stays canonical; the policy only decides
/// what the losing resolution observes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateDirentPolicy {
    /// Resolve with [`Dirent::invalid`](crate::Dirent::invalid).
    #[default]
    Sentinel,
    /// Resolve with the canonical cached entry.
    Shared,
    /// Fail with [`VfsError::AlreadyResolved`](crate::VfsError::AlreadyResolved).
    Reject,
}

/// Configuration for a [`Registry`](crate::Registry).
///
/// # Example
///
/// ```ignore
/// let registry = Registry::with_config(RegistryConfig {
///     duplicate_dirent: DuplicateDirentPolicy::Shared,
///     ..RegistryConfig::default()
/// });
/// ```
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Description attached to the root node.
    pub root_description: String,
    pub duplicate_dirent: DuplicateDirentPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root_description: "Root directory".into(),
            duplicate_dirent: DuplicateDirentPolicy::default(),
        }
    }
}
