//! Error types for the state container.
//!
//! Only [`StoreError`] ever reaches a caller. [`DurableError`] is produced by
//! durable storage backends and absorbed at the accessor boundary, where it
//! degrades to "no prior value".

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::DomainKey;

/// Boxed error returned by a fallible updater.
pub type UpdateSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by store writes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The updater passed to a write failed. The snapshot is unchanged.
    #[error("state update failed{}: {source}", domain_suffix(.domain))]
    UpdateFailed {
        domain: Option<DomainKey>,
        #[source]
        source: UpdateSource,
    },
}

fn domain_suffix(domain: &Option<DomainKey>) -> String {
    match domain {
        Some(key) => format!(" for domain '{}'", key),
        None => String::new(),
    }
}

impl StoreError {
    /// Attach the domain a failed write targeted.
    pub fn for_domain(self, key: DomainKey) -> Self {
        match self {
            StoreError::UpdateFailed { source, .. } => StoreError::UpdateFailed {
                domain: Some(key),
                source,
            },
        }
    }
}

/// Errors from durable client-side storage.
#[derive(Debug, Error)]
pub enum DurableError {
    #[error("durable storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("durable value under '{key}' is not valid: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("durable storage directory '{path}' is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
