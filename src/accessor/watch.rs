//! Subscriptions filtered to a selection of slots.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::ApplicationState;
use crate::registry::Domains;
use crate::store::Subscription;

/// A selection of state that can tell whether it changed by identity.
pub(crate) trait Selection: Send + 'static {
    fn same(&self, other: &Self) -> bool;
}

impl<T: Send + Sync + 'static> Selection for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl Selection for bool {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl<A: Selection, B: Selection> Selection for (A, B) {
    fn same(&self, other: &Self) -> bool {
        self.0.same(&other.0) && self.1.same(&other.1)
    }
}

impl<A: Selection, B: Selection, C: Selection> Selection for (A, B, C) {
    fn same(&self, other: &Self) -> bool {
        self.0.same(&other.0) && self.1.same(&other.1) && self.2.same(&other.2)
    }
}

/// Run `callback` after writes that change what `select` picks out.
pub(crate) fn watch<K, S, F>(domains: &Domains, select: S, callback: F) -> Subscription
where
    K: Selection,
    S: Fn(&ApplicationState) -> K + Send + Sync + 'static,
    F: Fn() + Send + Sync + 'static,
{
    let store = domains.store().clone();
    let last = Mutex::new(select(&store.get()));
    domains.subscribe(move || {
        let current = select(&store.get());
        let changed = {
            let mut last = last.lock();
            if last.same(&current) {
                false
            } else {
                *last = current;
                true
            }
        };
        if changed {
            callback();
        }
    })
}
