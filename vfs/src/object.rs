use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::{VfsError, VfsResult};

type ErasedWeak = Weak<dyn Any + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Access {
    /// Bound as `Arc<T>`, read-only.
    Shared,
    /// Bound as `Arc<RwLock<T>>`, readable and writable.
    Locked,
}

/// A type-erased, non-owning reference to an object published in the tree.
///
/// The owner keeps the `Arc`; the tree only holds a `Weak` plus enough type
/// information to check retrieval. Retrieval matches the exact `TypeId` of
/// the published type, there is no conversion between related types.
#[derive(Clone)]
pub struct Binding {
    object: ErasedWeak,
    access: Access,
    type_id: TypeId,
    type_name: &'static str,
}

impl Binding {
    /// Bind read-only access to `object`.
    ///
    /// Retrieving it through [`Registry::get_mut`](crate::Registry::get_mut)
    /// fails with [`VfsError::BadCast`].
    pub fn shared<T: Any + Send + Sync>(object: &Arc<T>) -> Self {
        let weak = Arc::downgrade(object);
        let object: ErasedWeak = weak;
        Self {
            object,
            access: Access::Shared,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Bind read-write access to the value guarded by `object`.
    ///
    /// The recorded type is `T`, not the lock around it.
    pub fn locked<T: Any + Send + Sync>(object: &Arc<RwLock<T>>) -> Self {
        let weak = Arc::downgrade(object);
        let object: ErasedWeak = weak;
        Self {
            object,
            access: Access::Locked,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the object was published read-only.
    pub fn is_const(&self) -> bool {
        self.access == Access::Shared
    }

    /// Whether the owner still holds the object.
    pub fn is_alive(&self) -> bool {
        self.object.strong_count() > 0
    }

    pub(crate) fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Read access to the object; `owner` names the node in error messages.
    pub(crate) fn get<T: Any + Send + Sync>(&self, owner: &str) -> VfsResult<ObjectRef<T>> {
        self.check_type::<T>(owner)?;
        let object = self.upgrade(owner)?;
        let cast = match self.access {
            Access::Shared => object.downcast::<T>().map(ObjectRef::Shared),
            Access::Locked => object.downcast::<RwLock<T>>().map(ObjectRef::Locked),
        };
        cast.map_err(|_| self.bad_cast(owner))
    }

    /// Write access to the object; fails on read-only bindings.
    pub(crate) fn get_mut<T: Any + Send + Sync>(&self, owner: &str) -> VfsResult<Arc<RwLock<T>>> {
        self.check_type::<T>(owner)?;
        if self.is_const() {
            return Err(VfsError::BadCast(format!(
                "{owner} must be retrieved as const {}",
                self.type_name
            )));
        }
        self.upgrade(owner)?
            .downcast::<RwLock<T>>()
            .map_err(|_| self.bad_cast(owner))
    }

    fn check_type<T: Any>(&self, owner: &str) -> VfsResult<()> {
        if self.is::<T>() {
            Ok(())
        } else {
            Err(self.bad_cast(owner))
        }
    }

    fn upgrade(&self, owner: &str) -> VfsResult<Arc<dyn Any + Send + Sync>> {
        self.object.upgrade().ok_or_else(|| {
            log::warn!("Object {} at {owner} was dropped by its owner", self.type_name);
            VfsError::Dangling(format!("{owner} ({}) was dropped", self.type_name))
        })
    }

    fn bad_cast(&self, owner: &str) -> VfsError {
        VfsError::BadCast(format!("{owner} is not of type {}", self.type_name))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("type", &self.type_name)
            .field("const", &self.is_const())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// An object retrieved from the tree.
///
/// Holds a strong reference for as long as the caller keeps it, so the
/// object cannot disappear mid-use even if its publisher drops it.
pub enum ObjectRef<T> {
    Shared(Arc<T>),
    Locked(Arc<RwLock<T>>),
}

impl<T> ObjectRef<T> {
    /// Read the object, taking the lock if it was published read-write.
    pub fn read(&self) -> ObjectGuard<'_, T> {
        match self {
            ObjectRef::Shared(object) => ObjectGuard::Plain(object),
            ObjectRef::Locked(object) => ObjectGuard::Locked(object.read()),
        }
    }

    /// Whether this is the very object owned by `other`.
    pub fn points_to<U>(&self, other: &Arc<U>) -> bool {
        let ours = match self {
            ObjectRef::Shared(object) => Arc::as_ptr(object).cast::<()>(),
            ObjectRef::Locked(object) => Arc::as_ptr(object).cast::<()>(),
        };
        std::ptr::eq(ours, Arc::as_ptr(other).cast::<()>())
    }
}

impl<T> Clone for ObjectRef<T> {
    fn clone(&self) -> Self {
        match self {
            ObjectRef::Shared(object) => ObjectRef::Shared(Arc::clone(object)),
            ObjectRef::Locked(object) => ObjectRef::Locked(Arc::clone(object)),
        }
    }
}

/// Read view returned by [`ObjectRef::read`].
pub enum ObjectGuard<'a, T> {
    Plain(&'a T),
    Locked(RwLockReadGuard<'a, T>),
}

impl<T> Deref for ObjectGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            ObjectGuard::Plain(value) => value,
            ObjectGuard::Locked(guard) => guard,
        }
    }
}
