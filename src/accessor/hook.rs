//! Per-component accessor with the seeding state machine.

use tracing::trace;

use super::domain::{DomainAccessor, DomainView, SeedOutcome};
use super::persisted::RestoreOutcome;
use crate::domain::Domain;
use crate::store::Subscription;

/// Where one hook instance is in its lifecycle.
///
/// ```text
/// Unseeded ──(client phase, first use)──→ Seeding ──(nothing queued)──→ Seeded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Server pass, or a client pass before the client phase began.
    Unseeded,
    /// Mount effect ran but its restore or seed write is still queued
    /// behind an in-flight notification.
    Seeding,
    /// Live for the rest of the component's lifetime.
    Seeded,
}

/// One consumer's handle on a domain.
///
/// Create one per mounted component via [`Domains::hook`](crate::registry::Domains::hook)
/// and drop it on unmount; dropping also drops any change subscription.
pub struct DomainHook<D: Domain> {
    accessor: DomainAccessor<D>,
    phase: HookPhase,
    last_initial: Option<D::Value>,
    subscription: Option<Subscription>,
}

impl<D: Domain> DomainHook<D> {
    pub(crate) fn new(accessor: DomainAccessor<D>) -> Self {
        Self {
            accessor,
            phase: HookPhase::Unseeded,
            last_initial: None,
            subscription: None,
        }
    }

    pub fn phase(&self) -> HookPhase {
        self.phase
    }

    pub fn accessor(&self) -> &DomainAccessor<D> {
        &self.accessor
    }

    /// Read the domain for this render, seeding from `initial` if allowed.
    ///
    /// Before the client phase this returns the default value with
    /// `is_ready == false` and has no side effects, whatever `initial` is.
    /// On the first call afterwards it restores persisted domains, then
    /// offers `initial`. Later calls offer `initial` again only when it
    /// differs from the last one this hook saw.
    ///
    /// When called from inside a change notification the mount writes are
    /// queued; the hook then stays in [`HookPhase::Seeding`] until a later
    /// call finds nothing outstanding.
    pub fn use_domain(&mut self, initial: Option<D::Value>) -> DomainView<D> {
        if !self.accessor.is_ready() {
            return self.accessor.view();
        }

        let mut queued = false;
        if self.phase == HookPhase::Unseeded {
            self.phase = HookPhase::Seeding;
            let restored = self.accessor.restore();
            trace!(domain = %D::KEY, ?restored, "Mount effect restore");
            queued |= restored == RestoreOutcome::Deferred;
        }

        if let Some(initial) = initial {
            if self.last_initial.as_ref() != Some(&initial) {
                let outcome = self.accessor.seed(initial.clone());
                trace!(domain = %D::KEY, ?outcome, "Offered initial value");
                queued |= outcome == SeedOutcome::Deferred;
                self.last_initial = Some(initial);
            }
        }

        if !queued {
            self.phase = HookPhase::Seeded;
        }
        self.accessor.view()
    }

    /// Re-render trigger: `callback` runs when this domain changes. Replaces
    /// any earlier callback.
    pub fn on_change<F>(&mut self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscription = Some(self.accessor.subscribe(callback));
    }
}
