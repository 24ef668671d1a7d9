//! # Entity Component System Storage
//!
//! Sparse-set pools behind a type-erased registry.
//!
//! ## Design Philosophy
//!
//! - One pool per component type, created at registration
//! - Components packed in dense arrays for cache efficiency
//! - Entity ids are plain indices into each pool's sparse array
//! - Dynamic dispatch only for registry-wide operations (disable broadcast)

mod component;
mod entity;
mod pool;
mod registry;
mod type_id;

pub use component::Component;
pub use entity::EntityId;
pub use pool::{ComponentPool, PoolHandle, ABSENT};
pub use registry::Registry;
pub use type_id::{component_type_id, ComponentTypeId, TypeIdAllocator, TYPE_ID_SPACE};
