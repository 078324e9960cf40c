//! Storage configuration.
//!
//! Loaded from TOML; every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! copy_buffer_size = 65536
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transfer buffer used by generic copies unless configured otherwise.
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Error loading a [`StorageConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for [`Storage`](crate::Storage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Buffer size in bytes for streamed copies.
    pub copy_buffer_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }
}

impl StorageConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded storage config");
        Ok(config)
    }

    /// Set the copy buffer size.
    pub fn with_copy_buffer_size(mut self, bytes: usize) -> Self {
        self.copy_buffer_size = bytes;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.copy_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "copy_buffer_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
