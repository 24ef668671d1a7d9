//! # Storage Error Types
//!
//! All errors the storage engine reports to its caller.

use thiserror::Error;

use crate::ecs::{ComponentTypeId, EntityId};

/// Errors that can occur in the storage engine.
///
/// Every failing operation leaves pool and registry state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A pool was requested for a type that was never registered.
    #[error("component '{component}' isn't registered")]
    UnregisteredComponent {
        /// Type name of the requested component.
        component: &'static str,
    },

    /// `add` on an entity that already holds the component.
    #[error("entity id {entity} already has component '{component}' attached")]
    ComponentAlreadyAttached {
        /// The entity that was targeted.
        entity: EntityId,
        /// Type name of the component.
        component: &'static str,
    },

    /// Strict access to a component the entity does not hold.
    #[error("entity id {entity} doesn't have component '{component}' attached")]
    ComponentNotAttached {
        /// The entity that was targeted.
        entity: EntityId,
        /// Type name of the component.
        component: &'static str,
    },

    /// The entity id is outside the live entity range.
    #[error("entity id {0} is invalid or doesn't exist")]
    InvalidEntityId(EntityId),

    /// The pool stored at a type id holds a different component type.
    #[error("pool for type id {type_id} stores '{stored}', not '{requested}'")]
    PoolTypeMismatch {
        /// The slot that was looked up.
        type_id: ComponentTypeId,
        /// Component type actually stored in the slot.
        stored: &'static str,
        /// Component type the caller asked for.
        requested: &'static str,
    },

    /// Every component type id has been handed out.
    #[error("no component type id left for '{component}' ({limit} ids in use)")]
    TypeIdSpaceExhausted {
        /// Type name of the component that asked for an id.
        component: &'static str,
        /// Number of ids the allocator can hand out.
        limit: u32,
    },

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
