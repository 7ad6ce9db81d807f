//! Configuration: TOML file with defaults for every field.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{SeedPolicy, SeedingConfig, StorageBackend, StorageConfig, StoreConfig};
