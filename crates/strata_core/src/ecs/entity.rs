//! # Entity Identifiers
//!
//! Entities carry no data of their own. An [`EntityId`] is a plain index
//! into every pool's sparse array; meaning comes from the components
//! attached to it.

use std::fmt;

/// Unique identifier for an entity.
///
/// Ids are assigned densely by the orchestrator. The storage engine treats
/// them purely as index space: "valid" is pool-relative and means the pool's
/// sparse array holds a dense slot at this index.
///
/// Ordering is by raw id value, which is the order
/// [`ComponentPool::active_entities`](super::ComponentPool::active_entities)
/// reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates an entity id from its raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the id as a sparse-array index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for EntityId {
    #[inline]
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
