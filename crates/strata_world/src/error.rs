//! # World Error Types

use strata_core::StorageError;
use thiserror::Error;

use crate::system::SystemId;

/// Errors that can occur while orchestrating entities and systems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Failure reported by the storage engine.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Every entity id up to the configured limit has been handed out.
    #[error("entity limit reached: {limit} entities already allocated")]
    EntityLimitReached {
        /// The configured maximum.
        limit: u32,
    },

    /// Every system id has been handed out.
    #[error("scheduler is full: {limit} systems already added")]
    SchedulerFull {
        /// Number of systems a scheduler can hold.
        limit: u32,
    },

    /// No system was added under this id.
    #[error("unknown system id {0}")]
    UnknownSystem(SystemId),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
