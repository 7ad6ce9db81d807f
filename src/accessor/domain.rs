use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::persisted;
use super::watch::watch;
use crate::config::SeedPolicy;
use crate::domain::{AccessorKind, ApplicationState, Domain, DomainKey};
use crate::error::{StoreError, UpdateSource};
use crate::registry::Domains;
use crate::store::{Effect, Subscription, WriteOutcome};

/// What a seeding attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The initial value was written into the store.
    Seeded,
    /// The live value already equals the initial value.
    Unchanged,
    /// The domain already diverged (user edit or earlier seed); the initial
    /// value was discarded and local state kept.
    Conflict,
    /// The client phase has not begun; nothing may be seeded yet.
    NotReady,
    /// The initial value did not have the domain's shape.
    Rejected,
    /// Issued while a write was notifying. Queued, and applied only if the
    /// domain still qualifies for seeding when the queue reaches it.
    Deferred,
}

impl SeedOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Unchanged => "unchanged",
            Self::Conflict => "conflict",
            Self::NotReady => "not-ready",
            Self::Rejected => "rejected",
            Self::Deferred => "deferred",
        }
    }
}

/// One render's read of a domain.
pub struct DomainView<D: Domain> {
    /// Default value until `is_ready`, live value afterwards.
    pub data: Arc<D::Value>,
    /// False during any pass that must match the server output.
    pub is_ready: bool,
    accessor: DomainAccessor<D>,
}

impl<D: Domain> DomainView<D> {
    /// Write through to the store. See [`DomainAccessor::set_data`].
    pub fn set_data<F>(&self, updater: F) -> WriteOutcome
    where
        F: FnOnce(&D::Value) -> D::Value + Send + 'static,
    {
        self.accessor.set_data(updater)
    }
}

impl<D: Domain> Clone for DomainView<D> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            is_ready: self.is_ready,
            accessor: self.accessor.clone(),
        }
    }
}

impl<D: Domain> fmt::Debug for DomainView<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainView")
            .field("domain", &D::KEY)
            .field("data", &self.data)
            .field("is_ready", &self.is_ready)
            .finish()
    }
}

/// Typed read/write access to one domain.
///
/// Holds no state of its own; every call goes to the shared store.
pub struct DomainAccessor<D: Domain> {
    domains: Domains,
    _domain: PhantomData<fn() -> D>,
}

impl<D: Domain> Clone for DomainAccessor<D> {
    fn clone(&self) -> Self {
        Self::new(self.domains.clone())
    }
}

impl<D: Domain> DomainAccessor<D> {
    pub(crate) fn new(domains: Domains) -> Self {
        Self {
            domains,
            _domain: PhantomData,
        }
    }

    pub fn key(&self) -> DomainKey {
        D::KEY
    }

    pub fn kind(&self) -> AccessorKind {
        D::KIND
    }

    pub fn is_ready(&self) -> bool {
        self.domains.is_client_phase()
    }

    /// Read the domain with the server-safe rule applied.
    pub fn view(&self) -> DomainView<D> {
        let state = self.domains.snapshot();
        DomainView {
            data: read::<D>(&state),
            is_ready: state.is_client_phase,
            accessor: self.clone(),
        }
    }

    pub fn data(&self) -> Arc<D::Value> {
        read::<D>(&self.domains.snapshot())
    }

    /// Replace this domain with `updater(current)`. Every other domain keeps
    /// its `Arc`. Marks the domain as user-edited; persisted domains are also
    /// written to durable storage.
    pub fn set_data<F>(&self, updater: F) -> WriteOutcome
    where
        F: FnOnce(&D::Value) -> D::Value + Send + 'static,
    {
        self.domains.store().set_then(
            move |state| D::replace(state, Arc::new(updater(D::slot(state)))),
            Some(self.commit_effect()),
        )
    }

    /// Like [`set_data`](Self::set_data) for updaters that can fail. A failed
    /// updater leaves the store, the ledger and durable storage untouched.
    pub fn try_set_data<F, E>(&self, updater: F) -> Result<WriteOutcome, StoreError>
    where
        F: FnOnce(&D::Value) -> Result<D::Value, E> + Send + 'static,
        E: Into<UpdateSource>,
    {
        self.domains
            .store()
            .try_set_then(
                move |state| {
                    let next = updater(D::slot(state))?;
                    Ok::<_, E>(D::replace(state, Arc::new(next)))
                },
                Some(self.commit_effect()),
            )
            .map_err(|e| e.for_domain(D::KEY))
    }

    /// Offer a server-supplied initial value.
    ///
    /// Writes it only after the client phase began, when the live value
    /// differs, and when the configured [`SeedPolicy`] allows: a domain the
    /// user edited is never overwritten. Persisted domains restore from
    /// durable storage first, and a restored value wins.
    ///
    /// The rule is checked again against the state the write actually runs
    /// on, so a seed queued behind a user edit is dropped when it drains.
    pub fn seed(&self, initial: D::Value) -> SeedOutcome {
        if !self.domains.is_client_phase() {
            return SeedOutcome::NotReady;
        }
        if D::KIND == AccessorKind::Persisted {
            self.restore();
        }

        let state = self.domains.snapshot();
        if let Err(outcome) = seed_rule::<D>(&self.domains, D::slot(&state), &initial) {
            if outcome == SeedOutcome::Conflict {
                debug!(domain = %D::KEY, "Discarding initial value, domain already diverged");
            }
            return outcome;
        }

        let domains = self.domains.clone();
        let applied = Arc::new(AtomicBool::new(false));
        let seeded = Arc::clone(&applied);
        let write = self.domains.store().set(move |state| {
            if seed_rule::<D>(&domains, D::slot(state), &initial).is_err() {
                return state.clone();
            }
            seeded.store(true, Ordering::SeqCst);
            D::replace(state, Arc::new(initial))
        });

        match write {
            WriteOutcome::Deferred => {
                debug!(domain = %D::KEY, "Seed queued behind an in-flight write");
                SeedOutcome::Deferred
            }
            WriteOutcome::Applied if applied.load(Ordering::SeqCst) => {
                debug!(domain = %D::KEY, "Seeded domain from initial value");
                SeedOutcome::Seeded
            }
            WriteOutcome::Applied => SeedOutcome::Conflict,
        }
    }

    /// Put the domain back to its default and forget user edits, so it can
    /// be seeded again. Persisted domains also drop their durable slot.
    pub fn reset(&self) -> WriteOutcome {
        let domains = self.domains.clone();
        let effect: Effect<ApplicationState> = Box::new(move |_| {
            domains.clear_edited(D::KEY);
            if D::KIND == AccessorKind::Persisted {
                persisted::forget::<D>(&domains);
            }
        });
        self.domains.store().set_then(
            |state| D::replace(state, Arc::new(D::Value::default())),
            Some(effect),
        )
    }

    /// Run `callback` after writes that change this domain or readiness.
    /// Writes to other domains are skipped by identity comparison.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        watch(
            &self.domains,
            |state: &ApplicationState| (Arc::clone(D::slot(state)), state.is_client_phase),
            callback,
        )
    }

    pub(crate) fn domains(&self) -> &Domains {
        &self.domains
    }

    fn commit_effect(&self) -> Effect<ApplicationState> {
        let domains = self.domains.clone();
        Box::new(move |state| {
            domains.mark_edited(D::KEY);
            if D::KIND == AccessorKind::Persisted {
                persisted::persist::<D>(&domains, D::slot(state));
            }
        })
    }
}

/// Whether `initial` may replace `live` under the configured policy.
fn seed_rule<D: Domain>(
    domains: &Domains,
    live: &D::Value,
    initial: &D::Value,
) -> Result<(), SeedOutcome> {
    if live == initial {
        return Err(SeedOutcome::Unchanged);
    }
    let edited = domains.is_edited(D::KEY);
    let allowed = match domains.config().seeding.policy {
        SeedPolicy::FirstSeedWins => !edited && *live == D::Value::default(),
        SeedPolicy::LastSeedWins => !edited,
    };
    if allowed {
        Ok(())
    } else {
        Err(SeedOutcome::Conflict)
    }
}

/// The domain's value under the readiness rule.
pub(crate) fn read<D: Domain>(state: &ApplicationState) -> Arc<D::Value> {
    if state.is_client_phase {
        Arc::clone(D::slot(state))
    } else {
        Arc::new(D::Value::default())
    }
}
