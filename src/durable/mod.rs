//! Durable client-side key/value storage.
//!
//! The persisted accessors (cart, briefcase) write through to one slot each
//! and restore from it on first client mount. Backends only move strings;
//! (de)serialization happens at the accessor.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::DurableError;

/// Key/value storage that survives a session, like browser `localStorage`.
pub trait DurableStorage: Send + Sync {
    /// Read a slot. A missing key is `Ok(None)`, not an error.
    fn get_item(&self, key: &str) -> Result<Option<String>, DurableError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), DurableError>;

    /// Remove a slot. Removing a missing key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), DurableError>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>, DurableError>;
}
