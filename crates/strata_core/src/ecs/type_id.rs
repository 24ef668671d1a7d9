//! # Component Type Identifiers
//!
//! Maps each distinct component type to a small integer, assigned lazily
//! on first request and kept for the lifetime of the allocator.
//!
//! The process-wide allocator ([`TypeIdAllocator::shared`]) is initialized
//! on first use and never reset or torn down. Tests that need isolated
//! numbering create their own instance with [`TypeIdAllocator::new`] and
//! inject it into a [`Registry`](super::Registry).

use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use super::component::{component_name, Component};
use crate::error::{StorageError, StorageResult};

/// Number of distinct ids a [`ComponentTypeId`] can represent.
pub const TYPE_ID_SPACE: u32 = 1 << 16;

/// Identifier of a component type within one allocator.
///
/// Two requests for the same type always yield the same id; two different
/// types never share one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentTypeId(u16);

impl ComponentTypeId {
    /// Creates a type id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns the id as a registry slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Assigns sequential identifiers to component types.
///
/// # Thread Safety
///
/// Safe to share between threads. The counter is advanced with an atomic
/// fetch-and-add and the type map sits behind a read-write lock, so
/// first-use requests for distinct types from different threads never
/// collide. Ids are never reused and there is no removal.
///
/// The id width is a design-time limit: ids `0..=u16::MAX` are handed
/// out, after which requests for new types fail with
/// [`StorageError::TypeIdSpaceExhausted`]. The counter never wraps, so an
/// exhausted allocator keeps every existing id unique.
pub struct TypeIdAllocator {
    /// Next identifier to hand out. Stops at `TYPE_ID_SPACE`.
    counter: AtomicU32,
    /// Types seen so far.
    assigned: RwLock<HashMap<TypeId, ComponentTypeId>>,
}

static SHARED: OnceLock<Arc<TypeIdAllocator>> = OnceLock::new();

impl TypeIdAllocator {
    /// Creates an empty allocator whose numbering starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
            assigned: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide allocator.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new())))
    }

    /// Returns the id of `C`, assigning the next free one on first request.
    ///
    /// # Errors
    ///
    /// [`StorageError::TypeIdSpaceExhausted`] if `C` has no id yet and all
    /// [`TYPE_ID_SPACE`] ids are taken.
    pub fn id_of<C: Component>(&self) -> StorageResult<ComponentTypeId> {
        let key = TypeId::of::<C>();

        if let Some(&id) = self.assigned.read().get(&key) {
            return Ok(id);
        }

        let mut assigned = self.assigned.write();
        // Another thread may have won the race between the two locks.
        match assigned.entry(key) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let raw = self
                    .counter
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                        (next < TYPE_ID_SPACE).then_some(next + 1)
                    })
                    .ok()
                    .and_then(|next| u16::try_from(next).ok())
                    .ok_or(StorageError::TypeIdSpaceExhausted {
                        component: component_name::<C>(),
                        limit: TYPE_ID_SPACE,
                    })?;

                tracing::trace!(
                    component = component_name::<C>(),
                    type_id = raw,
                    "assigned component type id"
                );
                Ok(*entry.insert(ComponentTypeId(raw)))
            }
        }
    }

    /// Returns the id of `C` if one was already assigned.
    #[must_use]
    pub fn lookup<C: Component>(&self) -> Option<ComponentTypeId> {
        self.assigned.read().get(&TypeId::of::<C>()).copied()
    }

    /// Returns the number of ids handed out so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.read().len()
    }

    /// Returns true if no id was handed out yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeIdAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeIdAllocator")
            .field("assigned", &self.len())
            .finish()
    }
}

/// Returns the process-wide id of `C`.
///
/// # Errors
///
/// Same as [`TypeIdAllocator::id_of`].
pub fn component_type_id<C: Component>() -> StorageResult<ComponentTypeId> {
    TypeIdAllocator::shared().id_of::<C>()
}
