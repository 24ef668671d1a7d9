//! # Component Pools
//!
//! One sparse set per component type:
//! - `dense` packs every live record contiguously, indices `0..len` all live
//! - `sparse[entity]` holds the record's dense index, or [`ABSENT`]
//! - a sorted copy of the owning entities is rebuilt lazily for iteration
//!
//! Removal swaps the last dense record into the freed slot, so the dense
//! array never has holes but its order is not preserved.
//!
//! ## Reference validity
//!
//! References handed out by `add`, `insert` or `get_mut` are only valid
//! until the next mutating call on the same pool. The borrow checker
//! enforces this.

use std::any::Any;
use std::fmt;

use super::component::{component_name, Component};
use super::entity::EntityId;
use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Sentinel stored in the sparse array for entities without the component.
pub const ABSENT: u32 = u32::MAX;

/// A component value together with the entity that owns it.
struct DenseRecord<C> {
    component: C,
    entity: EntityId,
}

/// Type-erased face of a [`ComponentPool`].
///
/// The registry stores pools behind this trait so it can act on every pool
/// without knowing the component types. Concrete access goes through the
/// `Any` accessors and a checked downcast.
pub trait PoolHandle: Send + Sync {
    /// Removes the entity's component, if any. Never fails.
    fn disable_entity(&mut self, entity: EntityId);

    /// Returns true if the entity holds this pool's component.
    fn has(&self, entity: EntityId) -> bool;

    /// Number of live records.
    fn len(&self) -> usize;

    /// Returns true if the pool holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the stored component type, for diagnostics.
    fn component_name(&self) -> &'static str;

    /// Upcast for checked downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for checked downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Sparse-set storage for one component type.
///
/// # Guarantees
///
/// After every operation, for every entity `e`:
/// - `has(e)` holds exactly when `sparse[e] != ABSENT`
/// - if it holds, `dense[sparse[e]].entity == e`
/// - `len()` equals the number of entities for which `has` holds
///
/// # Complexity
///
/// `add`, `insert`, `remove`, `has` and `get` are O(1) (amortized for the
/// inserting operations). `active_entities` costs O(n log n) on the first
/// call after a mutation and O(1) afterwards.
///
/// # Example
///
/// ```rust
/// use strata_core::{ComponentPool, EntityId};
///
/// let mut pool: ComponentPool<u32> = ComponentPool::new();
/// *pool.add(EntityId::new(5))? = 10;
/// *pool.add(EntityId::new(2))? = 20;
///
/// assert_eq!(pool.active_entities(), &[EntityId::new(2), EntityId::new(5)]);
/// assert_eq!(pool.get(EntityId::new(5)), Some(&10));
/// # Ok::<(), strata_core::StorageError>(())
/// ```
pub struct ComponentPool<C: Component> {
    /// Packed records, no gaps.
    dense: Vec<DenseRecord<C>>,
    /// Entity index -> dense index, or `ABSENT`.
    sparse: Vec<u32>,
    /// Owning entities sorted by id, valid while `cache_dirty` is false.
    cached_entities: Vec<EntityId>,
    /// Set by every mutation, cleared on rebuild.
    cache_dirty: bool,
    /// Sparse length used on first growth.
    sparse_floor: usize,
}

impl<C: Component> ComponentPool<C> {
    /// Creates an empty pool with the default storage configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&StorageConfig::default())
    }

    /// Creates an empty pool sized by `config`.
    ///
    /// Reserves `dense_reserve` records up front. The sparse array stays
    /// empty until the first insertion grows it to at least `sparse_floor`.
    /// A floor that is zero or not a power of two is rounded up to the next
    /// power of two, so the sparse length is always one.
    #[must_use]
    pub fn with_config(config: &StorageConfig) -> Self {
        Self {
            dense: Vec::with_capacity(config.dense_reserve),
            sparse: Vec::new(),
            cached_entities: Vec::new(),
            cache_dirty: true,
            sparse_floor: config.sparse_floor.max(1).next_power_of_two(),
        }
    }

    /// Number of live records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns true if the pool holds no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Current length of the sparse array.
    ///
    /// Never shrinks. Every slot at or past this length is implicitly absent.
    #[inline]
    #[must_use]
    pub fn sparse_len(&self) -> usize {
        self.sparse.len()
    }

    /// Checks if the entity holds this component.
    ///
    /// Out-of-range ids simply report `false`.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: EntityId) -> bool {
        self.dense_index_of(entity).is_some()
    }

    /// Returns the dense slot holding the entity's record.
    #[inline]
    #[must_use]
    pub fn dense_index_of(&self, entity: EntityId) -> Option<usize> {
        match self.sparse.get(entity.index()) {
            Some(&slot) if slot != ABSENT => Some(slot as usize),
            _ => None,
        }
    }

    /// Attaches a default-constructed component to the entity.
    ///
    /// # Errors
    ///
    /// [`StorageError::ComponentAlreadyAttached`] if the entity already holds
    /// the component. The existing value and the pool are left untouched.
    pub fn add(&mut self, entity: EntityId) -> StorageResult<&mut C> {
        self.insert(entity, C::default())
    }

    /// Attaches `component` to the entity.
    ///
    /// # Errors
    ///
    /// Same contract as [`add`](Self::add).
    pub fn insert(&mut self, entity: EntityId, component: C) -> StorageResult<&mut C> {
        if self.has(entity) {
            return Err(StorageError::ComponentAlreadyAttached {
                entity,
                component: component_name::<C>(),
            });
        }

        let index = entity.index();
        if index >= self.sparse.len() {
            self.grow_sparse(index);
        }

        let dense_index = self.dense.len();
        debug_assert!(dense_index < ABSENT as usize, "dense index space exhausted");
        self.dense.push(DenseRecord { component, entity });
        #[allow(clippy::cast_possible_truncation)]
        let slot = dense_index as u32;
        self.sparse[index] = slot;
        self.cache_dirty = true;

        Ok(&mut self.dense[dense_index].component)
    }

    /// Detaches the entity's component, returning it.
    ///
    /// A no-op returning `None` if the entity does not hold the component,
    /// so calling it twice is the same as calling it once.
    pub fn remove(&mut self, entity: EntityId) -> Option<C> {
        let dense_index = self.dense_index_of(entity)?;

        let removed = self.dense.swap_remove(dense_index);
        // The former last record now sits in the freed slot.
        if let Some(moved) = self.dense.get(dense_index) {
            #[allow(clippy::cast_possible_truncation)]
            let slot = dense_index as u32;
            self.sparse[moved.entity.index()] = slot;
        }
        self.sparse[entity.index()] = ABSENT;
        self.cache_dirty = true;

        Some(removed.component)
    }

    /// Strict variant of [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// [`StorageError::ComponentNotAttached`] if the entity does not hold
    /// the component.
    pub fn try_remove(&mut self, entity: EntityId) -> StorageResult<C> {
        self.remove(entity).ok_or(StorageError::ComponentNotAttached {
            entity,
            component: component_name::<C>(),
        })
    }

    /// Gets the entity's component.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        let dense_index = self.dense_index_of(entity)?;
        Some(&self.dense[dense_index].component)
    }

    /// Gets the entity's component mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        let dense_index = self.dense_index_of(entity)?;
        Some(&mut self.dense[dense_index].component)
    }

    /// Gets the entity's component.
    ///
    /// # Errors
    ///
    /// [`StorageError::ComponentNotAttached`] if the entity does not hold
    /// the component.
    pub fn try_get(&self, entity: EntityId) -> StorageResult<&C> {
        self.get(entity).ok_or(StorageError::ComponentNotAttached {
            entity,
            component: component_name::<C>(),
        })
    }

    /// Gets the entity's component mutably.
    ///
    /// # Errors
    ///
    /// [`StorageError::ComponentNotAttached`] if the entity does not hold
    /// the component.
    pub fn try_get_mut(&mut self, entity: EntityId) -> StorageResult<&mut C> {
        self.get_mut(entity).ok_or(StorageError::ComponentNotAttached {
            entity,
            component: component_name::<C>(),
        })
    }

    /// Returns every entity holding the component, sorted by id.
    ///
    /// Rebuilds the cached list first if anything changed since the last
    /// call, hence `&mut self`. Holders of a shared borrow can use
    /// [`cached_active_entities`](Self::cached_active_entities) or
    /// [`entities`](Self::entities).
    pub fn active_entities(&mut self) -> &[EntityId] {
        if self.cache_dirty {
            self.cached_entities.clear();
            self.cached_entities
                .extend(self.dense.iter().map(|record| record.entity));
            self.cached_entities.sort_unstable();
            self.cache_dirty = false;
        }
        &self.cached_entities
    }

    /// Returns the sorted entity list if it is current.
    ///
    /// `None` after any membership change until the next
    /// [`active_entities`](Self::active_entities) call rebuilds it.
    #[must_use]
    pub fn cached_active_entities(&self) -> Option<&[EntityId]> {
        (!self.cache_dirty).then_some(self.cached_entities.as_slice())
    }

    /// Iterates over the owning entities in dense order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.dense.iter().map(|record| record.entity)
    }

    /// Iterates over `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.dense
            .iter()
            .map(|record| (record.entity, &record.component))
    }

    /// Iterates mutably over `(entity, component)` pairs in dense order.
    ///
    /// Values change in place, membership does not, so the cached entity
    /// list stays valid.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.dense
            .iter_mut()
            .map(|record| (record.entity, &mut record.component))
    }

    /// Removes every record. The sparse array keeps its length.
    pub fn clear(&mut self) {
        for record in &self.dense {
            self.sparse[record.entity.index()] = ABSENT;
        }
        self.dense.clear();
        self.cache_dirty = true;
    }

    /// Grows the sparse array so `index` is in range.
    ///
    /// Starts at the configured floor and doubles from there; new slots are
    /// filled with `ABSENT`.
    fn grow_sparse(&mut self, index: usize) {
        let mut new_len = self.sparse.len().max(self.sparse_floor);
        while new_len <= index {
            new_len <<= 1;
        }
        tracing::trace!(
            component = component_name::<C>(),
            from = self.sparse.len(),
            to = new_len,
            "growing sparse array"
        );
        self.sparse.resize(new_len, ABSENT);
    }
}

impl<C: Component> Default for ComponentPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> fmt::Debug for ComponentPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentPool")
            .field("component", &component_name::<C>())
            .field("len", &self.dense.len())
            .field("sparse_len", &self.sparse.len())
            .field("cache_dirty", &self.cache_dirty)
            .finish()
    }
}

impl<C: Component> PoolHandle for ComponentPool<C> {
    #[inline]
    fn disable_entity(&mut self, entity: EntityId) {
        self.remove(entity);
    }

    #[inline]
    fn has(&self, entity: EntityId) -> bool {
        ComponentPool::has(self, entity)
    }

    #[inline]
    fn len(&self) -> usize {
        self.dense.len()
    }

    fn component_name(&self) -> &'static str {
        component_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
