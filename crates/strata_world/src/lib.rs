//! # STRATA World
//!
//! Entity lifecycle and system scheduling on top of [`strata_core`].
//!
//! - [`World`] hands out entity ids, tags them with an [`EntityGroup`] and
//!   strips every component from an entity when it is destroyed
//! - [`Scheduler`] runs [`System`]s each tick, throttled per system
//!
//! ## Example
//!
//! ```rust
//! use strata_world::{EntityGroup, Scheduler, SystemId, World, WorldConfig};
//!
//! #[derive(Default)]
//! struct Position { x: i32 }
//!
//! let mut world = World::with_config(WorldConfig::compact());
//! world.register_component::<Position>()?;
//!
//! let id = world.create_entity(EntityGroup::NONE)?;
//! world.add_component::<Position>(id)?;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add_system(|world: &mut World, _: SystemId, _: u32| {
//!     if let Ok(pool) = world.pool_mut::<Position>() {
//!         for (_, pos) in pool.iter_mut() {
//!             pos.x += 1;
//!         }
//!     }
//! }, 1)?;
//!
//! scheduler.run_tick(&mut world, 16);
//! assert_eq!(world.get_component::<Position>(id)?.x, 1);
//! # Ok::<(), strata_world::WorldError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod system;
pub mod world;

pub use config::WorldConfig;
pub use error::{WorldError, WorldResult};
pub use system::{Scheduler, System, SystemId, MAX_SYSTEMS};
pub use world::{EntityGroup, World};

pub use strata_core::{Component, EntityId, StorageConfig, StorageError};
