//! Readiness and seeding through per-component hooks.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::*;
use parking_lot::Mutex;
use tenant_state::accessor::{HookPhase, SeedOutcome};
use tenant_state::config::{SeedPolicy, StoreConfig};
use tenant_state::domain::{DomainKey, Product, Products, Providers, Settings, TenantSettings};
use tenant_state::durable::MemoryStorage;
use tenant_state::{Domains, WriteOutcome};

#[test]
fn products_scenario() {
    let domains = Domains::in_memory();
    let initial = vec![product(1, "X")];

    // Server pass.
    let mut hook = domains.hook::<Products>();
    let view = hook.use_domain(Some(initial.clone()));
    assert!(!view.is_ready);
    assert!(view.data.is_empty());

    // Client mount.
    domains.enter_client_phase();
    let view = hook.use_domain(Some(initial.clone()));
    assert!(view.is_ready);
    assert_eq!(*view.data, initial);

    let providers_before = Arc::clone(&domains.snapshot().providers);
    view.set_data(|prev| {
        let mut next = prev.clone();
        next.push(product(2, "Y"));
        next
    });

    let state = domains.store().get();
    let names: Vec<&str> = state.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["X", "Y"]);
    assert!(Arc::ptr_eq(&providers_before, &state.providers));
}

#[test]
fn server_pass_ignores_any_initial_value() {
    let domains = Domains::in_memory();
    let initials: Vec<Option<Vec<Product>>> = vec![
        None,
        Some(vec![]),
        Some(vec![product(1, "X")]),
        Some((0..50).map(|i| product(i, "bulk")).collect()),
    ];

    for initial in initials {
        let mut hook = domains.hook::<Products>();
        let view = hook.use_domain(initial);
        assert!(!view.is_ready);
        assert_eq!(*view.data, Vec::<Product>::default());
        assert_eq!(hook.phase(), HookPhase::Unseeded);
    }
    assert_eq!(domains.store().version(), 0);
}

#[test]
fn seeding_happens_once() {
    let domains = client_domains();
    let mut hook = domains.hook::<Products>();
    let initial = vec![product(1, "X")];

    hook.use_domain(Some(initial.clone()));
    let version = domains.store().version();

    // Same initial from this hook and from a second mount.
    hook.use_domain(Some(initial.clone()));
    let mut other = domains.hook::<Products>();
    other.use_domain(Some(initial.clone()));

    assert_eq!(domains.store().version(), version);
    assert_eq!(*domains.snapshot().products, initial);
}

#[test]
fn new_initial_after_user_edit_is_discarded() {
    let domains = client_domains();
    let mut hook = domains.hook::<Products>();
    hook.use_domain(Some(vec![product(1, "X")]));
    hook.accessor().set_data(|prev| {
        let mut next = prev.clone();
        next.push(product(2, "Y"));
        next
    });
    let edited = domains.snapshot().products.clone();

    let view = hook.use_domain(Some(vec![product(9, "Server")]));

    assert!(Arc::ptr_eq(&view.data, &edited));
    assert_eq!(
        domains.accessor::<Products>().seed(vec![product(9, "Server")]),
        SeedOutcome::Conflict
    );
}

#[test]
fn last_seed_wins_policy_replaces_unedited_seed() {
    let mut config = StoreConfig::default();
    config.seeding.policy = SeedPolicy::LastSeedWins;
    let domains = Domains::new(config, Arc::new(MemoryStorage::new()));
    domains.enter_client_phase();
    let settings = domains.accessor::<Settings>();

    let first = TenantSettings {
        tenant_name: "Acme".to_string(),
        ..TenantSettings::default()
    };
    let second = TenantSettings {
        tenant_name: "Acme Corp".to_string(),
        ..TenantSettings::default()
    };

    assert_eq!(settings.seed(first), SeedOutcome::Seeded);
    assert_eq!(settings.seed(second), SeedOutcome::Seeded);
    assert_eq!(settings.data().tenant_name, "Acme Corp");

    settings.set_data(|prev| TenantSettings {
        currency: "EUR".to_string(),
        ..prev.clone()
    });
    assert_eq!(settings.seed(TenantSettings::default()), SeedOutcome::Conflict);
    assert_eq!(settings.data().currency, "EUR");
}

#[test]
fn hooks_on_different_domains_are_independent() {
    let domains = client_domains();
    let mut products = domains.hook::<Products>();
    let mut providers = domains.hook::<Providers>();
    let counter = CallCounter::new();
    products.on_change(counter.callback());

    products.use_domain(Some(vec![product(1, "X")]));
    let view = providers.use_domain(None);

    assert!(view.is_ready);
    assert!(view.data.is_empty());
    assert_eq!(counter.get(), 1);
}

#[test]
fn seed_queued_behind_user_edit_is_dropped() {
    let domains = client_domains();
    let products = domains.accessor::<Products>();
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let fired = Arc::new(AtomicBool::new(false));

    let inner = products.clone();
    let seen = Arc::clone(&outcomes);
    let once = Arc::clone(&fired);
    let _sub = domains.subscribe(move || {
        if once.swap(true, Ordering::SeqCst) {
            return;
        }
        let edit = inner.set_data(|_| vec![product(7, "user edit")]);
        let seed = inner.seed(vec![product(1, "server")]);
        seen.lock().push((edit, seed));
    });

    domains.accessor::<Providers>().set_data(|prev| prev.clone());

    assert_eq!(
        *outcomes.lock(),
        vec![(WriteOutcome::Deferred, SeedOutcome::Deferred)]
    );
    let names: Vec<String> = domains
        .snapshot()
        .products
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["user edit"]);
    assert!(domains.is_edited(DomainKey::Products));
    assert_eq!(products.seed(vec![product(1, "server")]), SeedOutcome::Conflict);
}

#[test]
fn queued_seed_applies_when_domain_untouched() {
    let domains = client_domains();
    let settings = domains.accessor::<Settings>();
    let fired = Arc::new(AtomicBool::new(false));

    let inner = settings.clone();
    let once = Arc::clone(&fired);
    let _sub = domains.subscribe(move || {
        if !once.swap(true, Ordering::SeqCst) {
            let outcome = inner.seed(TenantSettings {
                tenant_name: "Acme".to_string(),
                ..TenantSettings::default()
            });
            assert_eq!(outcome, SeedOutcome::Deferred);
        }
    });

    domains.accessor::<Providers>().set_data(|prev| prev.clone());

    assert_eq!(settings.data().tenant_name, "Acme");
    assert!(!domains.is_edited(DomainKey::Settings));
}
