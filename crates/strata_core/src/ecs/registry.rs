//! # Pool Registry
//!
//! Owns one type-erased pool per registered component type, indexed by
//! [`ComponentTypeId`]. Typed access recovers the concrete pool with a
//! checked downcast, so asking for the wrong type is an error instead of a
//! reinterpretation of memory.

use std::fmt;
use std::sync::Arc;

use super::component::{component_name, Component};
use super::entity::EntityId;
use super::pool::{ComponentPool, PoolHandle};
use super::type_id::{ComponentTypeId, TypeIdAllocator};
use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Directory of component pools.
///
/// Slots grow with the highest registered type id. A slot goes from empty
/// to occupied at most once; pools are never replaced or unregistered and
/// are dropped together with the registry.
///
/// # Thread Safety
///
/// No internal locking. Callers serialize access, e.g. with a single
/// tick loop or an external lock around the whole registry.
///
/// # Example
///
/// ```rust
/// use strata_core::{EntityId, Registry, StorageError};
///
/// #[derive(Default)]
/// struct Velocity { dx: f32 }
///
/// let registry = Registry::new();
/// assert!(matches!(
///     registry.pool::<Velocity>(),
///     Err(StorageError::UnregisteredComponent { .. })
/// ));
/// ```
pub struct Registry {
    /// Source of type ids.
    type_ids: Arc<TypeIdAllocator>,
    /// Sizing for newly created pools.
    config: StorageConfig,
    /// Type id -> pool.
    slots: Vec<Option<Box<dyn PoolHandle>>>,
}

impl Registry {
    /// Creates an empty registry backed by the process-wide type ids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Creates an empty registry whose pools are sized by `config`.
    #[must_use]
    pub fn with_config(config: StorageConfig) -> Self {
        Self::with_allocator(TypeIdAllocator::shared(), config)
    }

    /// Creates an empty registry drawing type ids from `type_ids`.
    ///
    /// Registries sharing an allocator agree on every type's slot.
    #[must_use]
    pub fn with_allocator(type_ids: Arc<TypeIdAllocator>, config: StorageConfig) -> Self {
        Self {
            type_ids,
            config,
            slots: Vec::new(),
        }
    }

    /// The allocator this registry draws type ids from.
    #[must_use]
    pub fn type_ids(&self) -> &Arc<TypeIdAllocator> {
        &self.type_ids
    }

    /// The configuration new pools are created with.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Checks if a pool exists for the type id.
    #[inline]
    #[must_use]
    pub fn contains_id(&self, type_id: ComponentTypeId) -> bool {
        matches!(self.slots.get(type_id.index()), Some(Some(_)))
    }

    /// Checks if `C` is registered.
    #[must_use]
    pub fn contains<C: Component>(&self) -> bool {
        self.type_ids
            .lookup::<C>()
            .is_some_and(|type_id| self.contains_id(type_id))
    }

    /// Number of registered component types.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Registers `C`, creating its empty pool.
    ///
    /// # Returns
    ///
    /// `true` if the pool was created, `false` if `C` was already
    /// registered (the existing pool is kept as is).
    ///
    /// # Errors
    ///
    /// [`StorageError::TypeIdSpaceExhausted`] if `C` is new and the type-id
    /// allocator has no ids left.
    pub fn register<C: Component>(&mut self) -> StorageResult<bool> {
        let type_id = self.type_ids.id_of::<C>()?;
        if self.contains_id(type_id) {
            return Ok(false);
        }

        let index = type_id.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(Box::new(ComponentPool::<C>::with_config(&self.config)));

        tracing::debug!(
            component = component_name::<C>(),
            type_id = type_id.raw(),
            "registered component pool"
        );
        Ok(true)
    }

    /// Gets the pool for `C`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::UnregisteredComponent`] if `C` was never registered
    /// - [`StorageError::PoolTypeMismatch`] if the slot holds another type,
    ///   which only happens when registries are fed from different allocators
    pub fn pool<C: Component>(&self) -> StorageResult<&ComponentPool<C>> {
        let (type_id, handle) = self.slot::<C>()?;
        handle
            .as_any()
            .downcast_ref::<ComponentPool<C>>()
            .ok_or_else(|| mismatch::<C>(type_id, handle.component_name()))
    }

    /// Gets the pool for `C` mutably.
    ///
    /// # Errors
    ///
    /// Same as [`pool`](Self::pool).
    pub fn pool_mut<C: Component>(&mut self) -> StorageResult<&mut ComponentPool<C>> {
        let type_id = self
            .type_ids
            .lookup::<C>()
            .ok_or_else(unregistered::<C>)?;
        let handle = self
            .slots
            .get_mut(type_id.index())
            .and_then(Option::as_mut)
            .ok_or_else(unregistered::<C>)?;

        let stored = handle.component_name();
        handle
            .as_any_mut()
            .downcast_mut::<ComponentPool<C>>()
            .ok_or_else(|| mismatch::<C>(type_id, stored))
    }

    /// Gets the type-erased pool stored at `type_id`.
    #[must_use]
    pub fn handle(&self, type_id: ComponentTypeId) -> Option<&dyn PoolHandle> {
        self.slots.get(type_id.index())?.as_deref()
    }

    /// Removes the entity's component from every pool.
    ///
    /// Pools are visited in type-id order. Pools that never held the entity
    /// are unaffected, so this is safe to call for any id.
    pub fn disable_entity(&mut self, entity: EntityId) {
        for handle in self.slots.iter_mut().flatten() {
            handle.disable_entity(entity);
        }
        tracing::trace!(entity = entity.raw(), "disabled entity in all pools");
    }

    fn slot<C: Component>(&self) -> StorageResult<(ComponentTypeId, &dyn PoolHandle)> {
        let type_id = self
            .type_ids
            .lookup::<C>()
            .ok_or_else(unregistered::<C>)?;
        let handle = self.handle(type_id).ok_or_else(unregistered::<C>)?;
        Ok((type_id, handle))
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
            .field("registered", &self.registered_count())
            .field("slots", &self.slots.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn unregistered<C: Component>() -> StorageError {
    StorageError::UnregisteredComponent {
        component: component_name::<C>(),
    }
}

fn mismatch<C: Component>(type_id: ComponentTypeId, stored: &'static str) -> StorageError {
    StorageError::PoolTypeMismatch {
        type_id,
        stored,
        requested: component_name::<C>(),
    }
}
