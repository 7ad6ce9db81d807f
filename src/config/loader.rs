use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::StoreConfig;

const APP_DIR: &str = "tenant-state";
const FILE_NAME: &str = "config.toml";

/// Why a config file could not be turned into a [`StoreConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read store config '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store config '{path}' is not valid TOML: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid store config: {message}")]
    ValidationError { message: String },
}

impl StoreConfig {
    /// `<platform config dir>/tenant-state/config.toml`, or relative to the
    /// working directory when the platform has no config dir.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(FILE_NAME)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Read, parse and validate `path`. An absent file is not an error: the
    /// store then runs on defaults (in-memory storage, first seed wins).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(StoreConfig::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StoreConfig =
            toml::from_str(&text).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// The namespace must be non-blank and free of `:`, which separates it
    /// from the domain name in durable keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let namespace = &self.storage.namespace;
        if namespace.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "storage.namespace must not be empty".to_string(),
            });
        }

        if namespace.contains(':') {
            return Err(ConfigError::ValidationError {
                message: format!("storage.namespace '{}' must not contain ':'", namespace),
            });
        }

        Ok(())
    }
}
