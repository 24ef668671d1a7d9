//! # STRATA Core Storage Engine
//!
//! Sparse-set component storage for an Entity Component System:
//! - O(1) add / remove / lookup by entity id
//! - Packed, gap-free dense arrays for cache-friendly iteration
//! - Component types discovered at runtime, no compile-time type list
//!
//! ## Architecture Rules
//!
//! 1. **Dense stays dense** - removal swaps the last record into the hole
//! 2. **Sparse and dense agree** - every mutation re-links both directions
//! 3. **Misuse is an error** - double-attach, unregistered access and type
//!    mismatches surface as [`StorageError`], never as undefined access
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{EntityId, Registry};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut registry = Registry::new();
//! assert!(registry.register::<Position>()?);
//!
//! let pool = registry.pool_mut::<Position>()?;
//! pool.add(EntityId::new(3))?.x = 4.0;
//! assert_eq!(pool.active_entities(), &[EntityId::new(3)]);
//!
//! registry.disable_entity(EntityId::new(3));
//! assert!(!registry.pool::<Position>()?.has(EntityId::new(3)));
//! # Ok::<(), strata_core::StorageError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::StorageConfig;
pub use ecs::{
    component_type_id, Component, ComponentPool, ComponentTypeId, EntityId, PoolHandle, Registry,
    TypeIdAllocator, ABSENT, TYPE_ID_SPACE,
};
pub use error::{StorageError, StorageResult};
