//! # Systems and Scheduling
//!
//! Systems run once per scheduler tick, in the order they were added.
//! A system with tick rate `N` runs on every `N`-th tick; the ticks in
//! between are counted as skipped and their elapsed time is handed to
//! the next run.

use std::fmt;

use crate::error::{WorldError, WorldResult};
use crate::world::World;

/// Number of systems one [`Scheduler`] can hold; every `u16` is a valid id.
pub const MAX_SYSTEMS: u32 = 1 << 16;

/// Identifier handed out by [`Scheduler::add_system`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(u16);

impl SystemId {
    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game logic operating on the world.
///
/// Closures of the form `FnMut(&mut World, SystemId, u32)` implement this
/// trait directly.
pub trait System: Send {
    /// Runs the system.
    ///
    /// `elapsed_ms` covers every tick since the previous run of this
    /// system, including the skipped ones.
    fn update(&mut self, world: &mut World, id: SystemId, elapsed_ms: u32);

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> System for F
where
    F: FnMut(&mut World, SystemId, u32) + Send,
{
    fn update(&mut self, world: &mut World, id: SystemId, elapsed_ms: u32) {
        self(world, id, elapsed_ms);
    }
}

struct SystemEntry {
    system: Box<dyn System>,
    enabled: bool,
    /// Runs every `tick_rate` ticks. Never zero.
    tick_rate: u32,
    /// Ticks skipped since the last run.
    skipped_ticks: u32,
    /// Elapsed time carried over from skipped ticks.
    pending_ms: u32,
}

/// Runs systems against a [`World`] with per-system throttling.
///
/// # Example
///
/// ```rust
/// use strata_world::{Scheduler, SystemId, World, WorldConfig};
///
/// let mut world = World::with_config(WorldConfig::compact());
/// let mut scheduler = Scheduler::new();
///
/// let slow = scheduler.add_system(|_: &mut World, _: SystemId, elapsed_ms: u32| {
///     assert_eq!(elapsed_ms, 48);
/// }, 3)?;
///
/// for _ in 0..3 {
///     scheduler.run_tick(&mut world, 16);
/// }
/// assert_eq!(scheduler.skipped_ticks(slow)?, 0);
/// # Ok::<(), strata_world::WorldError>(())
/// ```
#[derive(Default)]
pub struct Scheduler {
    systems: Vec<SystemEntry>,
    tick_count: u64,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of systems added.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns true if no systems were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Number of ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Adds an enabled system. A `tick_rate` of zero is treated as one.
    ///
    /// # Errors
    ///
    /// [`WorldError::SchedulerFull`] once [`MAX_SYSTEMS`] systems were added.
    pub fn add_system<S: System + 'static>(
        &mut self,
        system: S,
        tick_rate: u32,
    ) -> WorldResult<SystemId> {
        let raw = u16::try_from(self.systems.len())
            .map_err(|_| WorldError::SchedulerFull { limit: MAX_SYSTEMS })?;

        tracing::debug!(system = system.name(), id = raw, tick_rate, "added system");
        self.systems.push(SystemEntry {
            system: Box::new(system),
            enabled: true,
            tick_rate: tick_rate.max(1),
            skipped_ticks: 0,
            pending_ms: 0,
        });
        Ok(SystemId(raw))
    }

    /// Enables or disables a system.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownSystem`] for ids not handed out by this scheduler.
    pub fn set_enabled(&mut self, id: SystemId, enabled: bool) -> WorldResult<()> {
        self.entry_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Checks if a system is enabled.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownSystem`].
    pub fn is_enabled(&self, id: SystemId) -> WorldResult<bool> {
        Ok(self.entry(id)?.enabled)
    }

    /// Changes how often a system runs. Zero is treated as one.
    ///
    /// The skip counter is kept, so a system already past the new rate
    /// runs on the next tick.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownSystem`].
    pub fn set_tick_rate(&mut self, id: SystemId, tick_rate: u32) -> WorldResult<()> {
        self.entry_mut(id)?.tick_rate = tick_rate.max(1);
        Ok(())
    }

    /// Ticks skipped since the system last ran.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownSystem`].
    pub fn skipped_ticks(&self, id: SystemId) -> WorldResult<u32> {
        Ok(self.entry(id)?.skipped_ticks)
    }

    /// Advances one tick. Returns how many systems ran.
    pub fn run_tick(&mut self, world: &mut World, elapsed_ms: u32) -> usize {
        self.tick_count += 1;
        let mut ran = 0;

        for (entry, raw) in self.systems.iter_mut().zip(0_u16..) {
            if !entry.enabled {
                continue;
            }

            entry.pending_ms = entry.pending_ms.saturating_add(elapsed_ms);
            if entry.skipped_ticks + 1 < entry.tick_rate {
                entry.skipped_ticks += 1;
                continue;
            }

            let elapsed = std::mem::take(&mut entry.pending_ms);
            entry.skipped_ticks = 0;
            tracing::trace!(system = entry.system.name(), elapsed_ms = elapsed, "running system");
            entry.system.update(world, SystemId(raw), elapsed);
            ran += 1;
        }

        ran
    }

    fn entry(&self, id: SystemId) -> WorldResult<&SystemEntry> {
        self.systems
            .get(id.index())
            .ok_or(WorldError::UnknownSystem(id))
    }

    fn entry_mut(&mut self, id: SystemId) -> WorldResult<&mut SystemEntry> {
        self.systems
            .get_mut(id.index())
            .ok_or(WorldError::UnknownSystem(id))
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("systems", &self.systems.len())
            .field("tick_count", &self.tick_count)
            .finish()
    }
}
