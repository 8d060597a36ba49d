use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dirent::Dirent;
use crate::error::{VfsError, VfsResult};
use crate::object::{Binding, ObjectRef};
use crate::path::Path;

const TYPE_NAME_WIDTH: usize = 20;

/// How [`Entry::walk`] treats tokens that have no matching child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkMode {
    /// Synthesize missing intermediate directories.
    pub create: bool,
    /// Stop at a mounted [`Dirent`] and leave the rest of the path unconsumed.
    pub partial: bool,
}

impl WalkMode {
    pub const LOOKUP: Self = Self {
        create: false,
        partial: false,
    };
    pub const CREATE: Self = Self {
        create: true,
        partial: false,
    };
    pub const PARTIAL: Self = Self {
        create: false,
        partial: true,
    };
}

/// Node in the mount tree.
///
/// A node owns its children and may hold a [`Binding`] to an object owned
/// elsewhere. Children keep mount order; names are unique among siblings.
pub struct Entry {
    name: String,
    description: String,
    binding: Option<Binding>,
    children: Vec<Entry>,
}

/// Snapshot of a node's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub description: String,
    /// Type of the bound object, `None` for plain directories.
    pub type_name: Option<&'static str>,
    pub is_const: bool,
    pub children: usize,
}

impl Entry {
    /// A directory node with no object.
    pub fn directory(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            binding: None,
            children: Vec::new(),
        }
    }

    /// A leaf node bound to an externally owned object.
    pub fn leaf(
        name: impl Into<String>,
        binding: Binding,
        description: impl Into<String>,
    ) -> Self {
        Self {
            binding: Some(binding),
            ..Self::directory(name, description)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    pub fn has_object(&self) -> bool {
        self.binding.is_some()
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.binding.as_ref().map(Binding::type_name)
    }

    /// Whether the bound object is read-only. Plain directories are not.
    pub fn is_const(&self) -> bool {
        self.binding.as_ref().is_some_and(Binding::is_const)
    }

    /// Whether this node holds a mounted directory entry.
    pub fn is_dirent(&self) -> bool {
        self.binding.as_ref().is_some_and(Binding::is::<Dirent>)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.children.iter()
    }

    pub fn child(&self, name: &str) -> Option<&Entry> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn info(&self) -> EntryInfo {
        EntryInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            type_name: self.type_name(),
            is_const: self.is_const(),
            children: self.children.len(),
        }
    }

    /// Fetch the object bound to this node.
    pub fn get<T: Any + Send + Sync>(&self) -> VfsResult<ObjectRef<T>> {
        self.binding()
            .ok_or_else(|| self.not_leaf())?
            .get::<T>(&self.name)
    }

    /// Fetch write access to the object bound to this node.
    pub fn get_mut<T: Any + Send + Sync>(&self) -> VfsResult<Arc<RwLock<T>>> {
        self.binding()
            .ok_or_else(|| self.not_leaf())?
            .get_mut::<T>(&self.name)
    }

    /// Walk `path` from this node, consuming one token per level.
    ///
    /// Returns `None` when a token has no matching child and the mode does
    /// not allow creating it. Tokens are popped only once they have been
    /// passed, so after a partial walk `path` holds the unresolved suffix.
    ///
    /// Creation never adds children under a bound object other than a
    /// directory entry.
    pub fn walk(&mut self, path: &mut Path, mode: WalkMode) -> Option<&mut Entry> {
        let mut current = self;

        while let Some(token) = path.front() {
            let index = match current.child_index(token) {
                Some(index) => index,
                None => {
                    if mode.partial && current.is_dirent() {
                        return Some(current);
                    }
                    if !mode.create || (current.has_object() && !current.is_dirent()) {
                        return None;
                    }
                    log::debug!("Creating directory {token} under {}", current.name);
                    current.children.push(Entry::directory(token, "Directory"));
                    current.children.len() - 1
                }
            };

            path.pop_front();
            current = &mut current.children[index];
        }

        Some(current)
    }

    /// Bind `binding` at `path` below this node.
    ///
    /// Intermediate directories are created only when `create` is set.
    /// Fails with [`VfsError::MountpointInvalid`] when the parent cannot be
    /// resolved, holds an object other than a [`Dirent`](crate::Dirent), or
    /// already has a child of that name. An existing mount is never replaced.
    pub(crate) fn mount(
        &mut self,
        mut path: Path,
        binding: Binding,
        description: &str,
        create: bool,
    ) -> VfsResult<()> {
        let Some(token) = path.pop_back() else {
            return Err(VfsError::MountpointInvalid(
                "cannot mount on the root".into(),
            ));
        };
        let parent_path = path.to_string();

        let mode = if create {
            WalkMode::CREATE
        } else {
            WalkMode::LOOKUP
        };
        let Some(parent) = self.walk(&mut path, mode) else {
            return Err(VfsError::MountpointInvalid(format!(
                "{parent_path} doesn't exist"
            )));
        };

        if parent.has_object() && !parent.is_dirent() {
            return Err(VfsError::MountpointInvalid(format!(
                "{parent_path} holds an object and cannot have children"
            )));
        }
        if parent.child(&token).is_some() {
            return Err(VfsError::MountpointInvalid(format!(
                "Mount point {token} occupied"
            )));
        }

        parent.children.push(Entry::leaf(token, binding, description));
        Ok(())
    }

    fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| child.name == name)
    }

    fn not_leaf(&self) -> VfsError {
        VfsError::NotLeaf(format!("{} does not hold an object", self.name))
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, tabs: &str) -> fmt::Result {
        write!(f, "{tabs}-- {}", self.name)?;
        match self.type_name() {
            Some(type_name) => writeln!(f, " ({})", display_type_name(type_name))?,
            None => writeln!(f)?,
        }

        let tabs = tabs.replace('`', " ");
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let connector = if i < last { "   |" } else { "   `" };
            child.write_tree(f, &format!("{tabs}{connector}"))?;
        }
        Ok(())
    }
}

/// ASCII rendering of the subtree, one node per line.
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, "")
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("binding", &self.binding)
            .field("children", &self.children)
            .finish()
    }
}

/// Drop module paths from the leading type and cap the width.
fn display_type_name(type_name: &str) -> String {
    let head_end = type_name.find('<').unwrap_or(type_name.len());
    let start = type_name[..head_end].rfind("::").map_or(0, |i| i + 2);
    let short = &type_name[start..];

    if short.chars().count() <= TYPE_NAME_WIDTH {
        return short.to_owned();
    }
    let mut truncated: String = short.chars().take(TYPE_NAME_WIDTH - 3).collect();
    truncated.push_str("...");
    truncated
}
