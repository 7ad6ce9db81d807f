use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seeding: SeedingConfig,
}

/// Durable storage used by the persisted accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Prefix for every durable key (`{namespace}:{domain}`). Lets several
    /// tenants share one browser profile or storage directory.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Which backend to use: "memory" or "file".
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for the file backend (default: platform data dir).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

/// How server-supplied initial values interact with live state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedingConfig {
    #[serde(default)]
    pub policy: SeedPolicy,
}

/// Which seed wins when a domain receives several initial values.
///
/// Under both policies a domain the user has edited is never overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// Seed only while the domain still holds its default value.
    #[default]
    FirstSeedWins,
    /// A newer initial value replaces an older seed.
    LastSeedWins,
}

fn default_namespace() -> String {
    "tenant".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            backend: StorageBackend::default(),
            dir: None,
        }
    }
}
