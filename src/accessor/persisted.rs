//! Durable round trip for persisted domains (cart, briefcase).
//!
//! Storage problems never reach the caller: an unreadable slot restores as
//! "absent" and a failed write-through only logs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::DomainAccessor;
use crate::domain::{AccessorKind, Domain};
use crate::error::DurableError;
use crate::registry::Domains;
use crate::store::WriteOutcome;

/// What a restore attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A stored value replaced the domain and now takes precedence over
    /// server-supplied initial values.
    Restored,
    /// Nothing stored.
    Absent,
    /// The slot could not be read or parsed and was ignored.
    Discarded,
    /// Not a persisted domain, not yet in the client phase, already
    /// attempted this session, or the user edited the domain first.
    Skipped,
    /// A stored value was found while a write was notifying. It is queued
    /// and applied unless another write changes the domain first.
    Deferred,
}

impl<D: Domain> DomainAccessor<D> {
    /// Restore the domain from durable storage, at most once per session.
    pub fn restore(&self) -> RestoreOutcome {
        let domains = self.domains();
        if D::KIND != AccessorKind::Persisted || !domains.is_client_phase() {
            return RestoreOutcome::Skipped;
        }
        if domains.is_edited(D::KEY) || !domains.begin_restore(D::KEY) {
            return RestoreOutcome::Skipped;
        }

        match load::<D>(domains) {
            Ok(Some(value)) => {
                // Counts as a user edit from here on, so no seed can replace it.
                domains.mark_edited(D::KEY);
                let live = Arc::clone(D::slot(&domains.snapshot()));
                let applied = Arc::new(AtomicBool::new(false));
                let restored = Arc::clone(&applied);
                let write = domains.store().set(move |state| {
                    // A write that landed first wins over the stored value.
                    if !Arc::ptr_eq(D::slot(state), &live) {
                        return state.clone();
                    }
                    restored.store(true, Ordering::SeqCst);
                    D::replace(state, Arc::new(value))
                });
                match write {
                    WriteOutcome::Deferred => RestoreOutcome::Deferred,
                    WriteOutcome::Applied if applied.load(Ordering::SeqCst) => {
                        debug!(domain = %D::KEY, "Restored domain from durable storage");
                        RestoreOutcome::Restored
                    }
                    WriteOutcome::Applied => RestoreOutcome::Skipped,
                }
            }
            Ok(None) => RestoreOutcome::Absent,
            Err(error) => {
                warn!(domain = %D::KEY, error = %error, "Ignoring unreadable durable value");
                RestoreOutcome::Discarded
            }
        }
    }

    /// Read the durable slot without touching the store.
    pub fn load_persisted(&self) -> Result<Option<D::Value>, DurableError> {
        load::<D>(self.domains())
    }
}

pub(crate) fn load<D: Domain>(domains: &Domains) -> Result<Option<D::Value>, DurableError> {
    let key = domains.storage_key(D::KEY);
    let Some(raw) = domains.storage().get_item(&key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| DurableError::Parse { key, source })
}

pub(crate) fn persist<D: Domain>(domains: &Domains, value: &D::Value) {
    let key = domains.storage_key(D::KEY);
    let result = serde_json::to_string(value)
        .map_err(|source| DurableError::Serialize {
            key: key.clone(),
            source,
        })
        .and_then(|json| domains.storage().set_item(&key, &json));
    if let Err(error) = result {
        warn!(domain = %D::KEY, error = %error, "Failed to persist domain value");
    }
}

pub(crate) fn forget<D: Domain>(domains: &Domains) {
    let key = domains.storage_key(D::KEY);
    if let Err(error) = domains.storage().remove_item(&key) {
        warn!(domain = %D::KEY, error = %error, "Failed to remove durable value");
    }
}
