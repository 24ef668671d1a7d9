//! # Storage Configuration
//!
//! Sizing knobs for component pools, loaded once at startup.
//!
//! ```toml
//! sparse_floor = 8192
//! dense_reserve = 1024
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{StorageError, StorageResult};

/// Configuration for component pools.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Sparse-array length on first growth. Must be a non-zero power of two.
    pub sparse_floor: usize,
    /// Dense records reserved up front per pool.
    pub dense_reserve: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            // Typical entity counts fit without a second growth.
            sparse_floor: 8192,
            dense_reserve: 1024,
        }
    }
}

impl StorageConfig {
    /// Small footprint for tools and tests.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            sparse_floor: 64,
            dense_reserve: 0,
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidConfig`] on malformed TOML, unknown keys or
    /// values rejected by [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> StorageResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StorageError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidConfig`] if the file cannot be read or its
    /// contents are invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> StorageResult<Self> {
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
    /// [`StorageError::InvalidConfig`] if `sparse_floor` is zero or not a
    /// power of two.
    pub fn validate(&self) -> StorageResult<()> {
        if !self.sparse_floor.is_power_of_two() {
            return Err(StorageError::InvalidConfig(format!(
                "sparse_floor must be a non-zero power of two, got {}",
                self.sparse_floor
            )));
        }
        Ok(())
    }
}
