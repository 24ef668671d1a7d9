//! # World
//!
//! Entity lifecycle on top of the component registry.
//!
//! Entity ids are handed out sequentially and never reused: a retired id
//! stays retired. Retiring an entity broadcasts a disable to every pool so
//! no component outlives its owner.

use strata_core::{Component, ComponentPool, EntityId, Registry, StorageError};

use crate::config::WorldConfig;
use crate::error::{WorldError, WorldResult};

/// Group tag attached to an entity at creation.
///
/// Applications define their own groups as constants:
///
/// ```rust
/// use strata_world::EntityGroup;
///
/// const ENEMIES: EntityGroup = EntityGroup::new(1);
/// assert_ne!(ENEMIES, EntityGroup::NONE);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityGroup(u16);

impl EntityGroup {
    /// Entities belonging to no particular group.
    pub const NONE: Self = Self(0);

    /// Creates a group tag.
    #[inline]
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw tag value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Per-id bookkeeping.
#[derive(Clone, Copy, Debug)]
struct EntityRecord {
    /// Whether this id is currently alive.
    active: bool,
    group: EntityGroup,
}

/// Owns the component registry and the entity table.
///
/// # Example
///
/// ```rust
/// use strata_world::{EntityGroup, World, WorldConfig};
///
/// #[derive(Default)]
/// struct Health(u32);
///
/// let mut world = World::with_config(WorldConfig::compact());
/// world.register_component::<Health>()?;
///
/// let hero = world.create_entity(EntityGroup::NONE)?;
/// world.add_component::<Health>(hero)?.0 = 100;
///
/// world.destroy_entity(hero)?;
/// assert!(!world.has_component::<Health>(hero));
/// # Ok::<(), strata_world::WorldError>(())
/// ```
pub struct World {
    registry: Registry,
    /// Indexed by entity id; grows by one per created entity.
    entities: Vec<EntityRecord>,
    alive_count: usize,
    max_entities: u32,
}

impl World {
    /// Creates a world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world from `config`.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self::with_registry(Registry::with_config(config.storage), config.max_entities)
    }

    /// Creates a world around an existing registry.
    ///
    /// Used to inject a registry with its own type-id allocator.
    #[must_use]
    pub fn with_registry(registry: Registry, max_entities: u32) -> Self {
        Self {
            registry,
            entities: Vec::new(),
            alive_count: 0,
            max_entities,
        }
    }

    /// The component registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The component registry, mutably.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of ids handed out so far, alive or retired.
    #[inline]
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.entities.len()
    }

    /// Maximum number of ids this world will hand out.
    #[inline]
    #[must_use]
    pub const fn max_entities(&self) -> u32 {
        self.max_entities
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates a new entity in `group`.
    ///
    /// # Errors
    ///
    /// [`WorldError::EntityLimitReached`] once `max_entities` ids have been
    /// handed out.
    pub fn create_entity(&mut self, group: EntityGroup) -> WorldResult<EntityId> {
        let next = u32::try_from(self.entities.len())
            .ok()
            .filter(|&next| next < self.max_entities)
            .ok_or(WorldError::EntityLimitReached {
                limit: self.max_entities,
            })?;

        self.entities.push(EntityRecord {
            active: true,
            group,
        });
        self.alive_count += 1;

        let id = EntityId::new(next);
        tracing::trace!(entity = next, group = group.raw(), "created entity");
        Ok(id)
    }

    /// Retires an entity and strips it from every component pool.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidEntityId`] (wrapped) if the id was never
    /// handed out or is already retired.
    pub fn destroy_entity(&mut self, entity: EntityId) -> WorldResult<()> {
        self.check_alive(entity)?;

        self.entities[entity.index()].active = false;
        self.alive_count -= 1;
        self.registry.disable_entity(entity);

        tracing::debug!(entity = entity.raw(), "destroyed entity");
        Ok(())
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities
            .get(entity.index())
            .is_some_and(|record| record.active)
    }

    /// Fails unless the entity is alive.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidEntityId`] (wrapped).
    pub fn check_alive(&self, entity: EntityId) -> WorldResult<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(StorageError::InvalidEntityId(entity).into())
        }
    }

    /// Returns the entity's group.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidEntityId`] (wrapped) if the entity is not alive.
    pub fn group_of(&self, entity: EntityId) -> WorldResult<EntityGroup> {
        self.check_alive(entity)?;
        Ok(self.entities[entity.index()].group)
    }

    /// Moves the entity to another group.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidEntityId`] (wrapped) if the entity is not alive.
    pub fn set_group(&mut self, entity: EntityId, group: EntityGroup) -> WorldResult<()> {
        self.check_alive(entity)?;
        self.entities[entity.index()].group = group;
        Ok(())
    }

    /// Iterates over alive entities in id order.
    pub fn alive_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .zip(0_u32..)
            .filter(|(record, _)| record.active)
            .map(|(_, raw)| EntityId::new(raw))
    }

    /// Iterates over alive entities of `group` in id order.
    pub fn entities_in_group(&self, group: EntityGroup) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .zip(0_u32..)
            .filter(move |(record, _)| record.active && record.group == group)
            .map(|(_, raw)| EntityId::new(raw))
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers a component type. Returns `false` if already registered.
    ///
    /// # Errors
    ///
    /// [`StorageError::TypeIdSpaceExhausted`] (wrapped) if no type id is left.
    pub fn register_component<C: Component>(&mut self) -> WorldResult<bool> {
        Ok(self.registry.register::<C>()?)
    }

    /// Attaches a default-constructed `C` to a live entity.
    ///
    /// # Errors
    ///
    /// Invalid entity, unregistered type, or component already attached.
    pub fn add_component<C: Component>(&mut self, entity: EntityId) -> WorldResult<&mut C> {
        self.check_alive(entity)?;
        Ok(self.registry.pool_mut::<C>()?.add(entity)?)
    }

    /// Attaches `component` to a live entity.
    ///
    /// # Errors
    ///
    /// Same as [`add_component`](Self::add_component).
    pub fn insert_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> WorldResult<&mut C> {
        self.check_alive(entity)?;
        Ok(self.registry.pool_mut::<C>()?.insert(entity, component)?)
    }

    /// Detaches `C` from a live entity, returning it if it was attached.
    ///
    /// # Errors
    ///
    /// Invalid entity or unregistered type.
    pub fn remove_component<C: Component>(&mut self, entity: EntityId) -> WorldResult<Option<C>> {
        self.check_alive(entity)?;
        Ok(self.registry.pool_mut::<C>()?.remove(entity))
    }

    /// Gets a live entity's `C`.
    ///
    /// # Errors
    ///
    /// Invalid entity, unregistered type, or component not attached.
    pub fn get_component<C: Component>(&self, entity: EntityId) -> WorldResult<&C> {
        self.check_alive(entity)?;
        Ok(self.registry.pool::<C>()?.try_get(entity)?)
    }

    /// Gets a live entity's `C` mutably.
    ///
    /// # Errors
    ///
    /// Same as [`get_component`](Self::get_component).
    pub fn get_component_mut<C: Component>(&mut self, entity: EntityId) -> WorldResult<&mut C> {
        self.check_alive(entity)?;
        Ok(self.registry.pool_mut::<C>()?.try_get_mut(entity)?)
    }

    /// Checks if a live entity holds `C`. Unregistered types report `false`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: EntityId) -> bool {
        self.is_alive(entity)
            && self
                .registry
                .pool::<C>()
                .is_ok_and(|pool| pool.has(entity))
    }

    /// The pool for `C`.
    ///
    /// # Errors
    ///
    /// Unregistered type.
    pub fn pool<C: Component>(&self) -> WorldResult<&ComponentPool<C>> {
        Ok(self.registry.pool::<C>()?)
    }

    /// The pool for `C`, mutably.
    ///
    /// # Errors
    ///
    /// Unregistered type.
    pub fn pool_mut<C: Component>(&mut self) -> WorldResult<&mut ComponentPool<C>> {
        Ok(self.registry.pool_mut::<C>()?)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("alive", &self.alive_count)
            .field("allocated", &self.entities.len())
            .field("max_entities", &self.max_entities)
            .field("registry", &self.registry)
            .finish()
    }
}
