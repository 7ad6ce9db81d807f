//! Store core contract: snapshots, identity preservation, notifications.

mod common;

use std::sync::Arc;

use common::*;
use proptest::prelude::*;
use tenant_state::domain::{ApplicationState, Domain, DomainKey, DomainVisitor};
use tenant_state::{Domains, Store, StoreError, WriteOutcome};

/// Every slot of the state, as raw pointers, in table order.
fn slot_pointers(state: &ApplicationState) -> Vec<(DomainKey, usize)> {
    struct SlotPointer<'a>(&'a ApplicationState);

    impl DomainVisitor for SlotPointer<'_> {
        type Output = usize;

        fn visit<D: Domain>(self) -> usize {
            Arc::as_ptr(D::slot(self.0)) as *const () as usize
        }
    }

    DomainKey::all()
        .iter()
        .map(|key| (*key, key.visit(SlotPointer(state))))
        .collect()
}

/// Rewrite one domain with a copy of itself, whatever its type.
struct TouchDomain<'a>(&'a Domains);

impl DomainVisitor for TouchDomain<'_> {
    type Output = WriteOutcome;

    fn visit<D: Domain>(self) -> WriteOutcome {
        self.0.accessor::<D>().set_data(|prev| prev.clone())
    }
}

#[test]
fn get_twice_returns_same_snapshot() {
    let domains = client_domains();
    let first = domains.store().get();
    let second = domains.store().get();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn each_write_changes_only_its_domain() {
    let domains = client_domains();

    for key in DomainKey::all() {
        let before = slot_pointers(&domains.snapshot());
        assert_eq!(key.visit(TouchDomain(&domains)), WriteOutcome::Applied);
        let after = slot_pointers(&domains.snapshot());

        for ((k, old), (_, new)) in before.iter().zip(after.iter()) {
            if k == key {
                assert_ne!(old, new, "{} should have a new value", k);
            } else {
                assert_eq!(old, new, "{} changed while writing {}", k, key);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn any_write_sequence_touches_only_written_domains(
        writes in prop::collection::vec(0..DomainKey::all().len(), 1..40),
    ) {
        let domains = client_domains();

        for index in writes {
            let key = DomainKey::all()[index];
            let before = slot_pointers(&domains.snapshot());
            key.visit(TouchDomain(&domains));
            let after = slot_pointers(&domains.snapshot());

            for ((k, old), (_, new)) in before.iter().zip(after.iter()) {
                if *k == key {
                    prop_assert_ne!(old, new);
                } else {
                    prop_assert_eq!(old, new, "{} changed while writing {}", k, key);
                }
            }
        }
    }
}

#[test]
fn notification_count_matches_writes_while_subscribed() {
    let store: Store<ApplicationState> = Store::default();
    let counter = CallCounter::new();

    store.set(|s| s.clone());
    let subscription = store.subscribe(counter.callback());
    for _ in 0..5 {
        store.set(|s| s.clone());
    }
    assert_eq!(counter.get(), 5);

    subscription.unsubscribe();
    subscription.unsubscribe();
    store.set(|s| s.clone());
    assert_eq!(counter.get(), 5);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn failed_update_is_reported_and_changes_nothing() {
    let domains = client_domains();
    let counter = CallCounter::new();
    let _sub = domains.subscribe(counter.callback());
    let before = domains.snapshot();

    let result = domains
        .accessor::<tenant_state::domain::Products>()
        .try_set_data(|_| Err::<Vec<_>, _>("catalogue offline"));

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        StoreError::UpdateFailed {
            domain: Some(DomainKey::Products),
            ..
        }
    ));
    assert!(err.to_string().contains("catalogue offline"));
    assert!(Arc::ptr_eq(&before, &domains.snapshot()));
    assert_eq!(counter.get(), 0);
    assert!(!domains.is_edited(DomainKey::Products));
}

#[test]
fn write_from_subscriber_runs_after_current_round() {
    let domains = client_domains();
    let products = domains.accessor::<tenant_state::domain::Products>();
    let writer = products.clone();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let log = Arc::clone(&seen);
    let _first = products.subscribe(move || {
        let len = writer.data().len();
        log.lock().push(("first", len));
        if len == 1 {
            let outcome = writer.set_data(|prev| {
                let mut next = prev.clone();
                next.push(product(2, "Y"));
                next
            });
            assert_eq!(outcome, WriteOutcome::Deferred);
        }
    });
    let reader = products.clone();
    let log = Arc::clone(&seen);
    let _second = products.subscribe(move || {
        log.lock().push(("second", reader.data().len()));
    });

    products.set_data(|_| vec![product(1, "X")]);

    assert_eq!(
        *seen.lock(),
        vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
    );
}
