//! # World Configuration
//!
//! ```toml
//! max_entities = 1000000
//!
//! [storage]
//! sparse_floor = 8192
//! dense_reserve = 1024
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_core::{StorageConfig, StorageError};

use crate::error::WorldResult;

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Maximum number of entity ids ever handed out. Ids are not reused.
    pub max_entities: u32,
    /// Sizing for every component pool.
    pub storage: StorageConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: 1_000_000,
            storage: StorageConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Small footprint for tools and tests.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            max_entities: 4096,
            storage: StorageConfig::compact(),
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidConfig`] (wrapped) on malformed TOML, unknown
    /// keys or out-of-range values.
    pub fn from_toml_str(source: &str) -> WorldResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StorageError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Same as [`from_toml_str`](Self::from_toml_str), plus unreadable files.
    pub fn from_toml_file(path: impl AsRef<Path>) -> WorldResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            StorageError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value constraints.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidConfig`] (wrapped) if `max_entities` is zero or
    /// the storage section is invalid.
    pub fn validate(&self) -> WorldResult<()> {
        if self.max_entities == 0 {
            let reason = "max_entities must be at least 1".to_owned();
            return Err(StorageError::InvalidConfig(reason).into());
        }
        self.storage.validate()?;
        Ok(())
    }
}
