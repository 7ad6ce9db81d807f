//! Persisted domains across sessions with the file backend.

mod common;

use common::*;
use tenant_state::accessor::{HookPhase, RestoreOutcome, SeedOutcome};
use tenant_state::domain::{Briefcase, BriefcaseItem, Cart, DomainKey};
use tenant_state::SeedPayload;

fn saved(id: &str) -> BriefcaseItem {
    BriefcaseItem {
        id: id.to_string(),
        title: format!("Saved {}", id),
        kind: "listing".to_string(),
        note: None,
    }
}

#[test]
fn cart_survives_a_fresh_session() {
    let (_temp, config) = file_config();
    let items = vec![cart_item(1, 2), cart_item(7, 1)];

    {
        let session = fresh_session(&config);
        session.enter_client_phase();
        let mut cart = session.hook::<Cart>();
        cart.use_domain(None);
        let stored = items.clone();
        cart.accessor().set_data(move |_| stored);
    }

    let session = fresh_session(&config);
    let mut cart = session.hook::<Cart>();
    assert!(cart.use_domain(None).data.is_empty());

    session.enter_client_phase();
    let view = cart.use_domain(None);
    assert!(view.is_ready);
    assert_eq!(*view.data, items);
}

#[test]
fn restored_value_beats_server_initial() {
    let (_temp, config) = file_config();
    {
        let session = fresh_session(&config);
        session.enter_client_phase();
        session
            .accessor::<Briefcase>()
            .set_data(|_| vec![saved("mine")]);
    }

    let session = fresh_session(&config);
    session.enter_client_phase();
    let mut briefcase = session.hook::<Briefcase>();
    let view = briefcase.use_domain(Some(vec![saved("server")]));

    assert_eq!(*view.data, vec![saved("mine")]);
    assert!(session.is_edited(DomainKey::Briefcase));
    assert_eq!(briefcase.phase(), HookPhase::Seeded);
}

#[test]
fn empty_storage_falls_back_to_initial() {
    let (_temp, config) = file_config();
    let session = fresh_session(&config);
    session.enter_client_phase();

    let mut briefcase = session.hook::<Briefcase>();
    let view = briefcase.use_domain(Some(vec![saved("server")]));

    assert_eq!(*view.data, vec![saved("server")]);
    assert_eq!(
        session.accessor::<Briefcase>().restore(),
        RestoreOutcome::Skipped
    );
}

#[test]
fn corrupt_storage_falls_back_to_initial() {
    let (_temp, config) = file_config();
    let dir = storage_dir(&config);
    {
        let session = fresh_session(&config);
        session
            .storage()
            .set_item(&session.storage_key(DomainKey::Cart), "[{\"lineId\": 42")
            .unwrap();
    }
    assert!(dir.join("tenant%3Acart.json").is_file());

    let session = fresh_session(&config);
    session.enter_client_phase();
    let initial = vec![cart_item(3, 1)];
    let mut cart = session.hook::<Cart>();
    let view = cart.use_domain(Some(initial.clone()));

    assert_eq!(*view.data, initial);
}

#[test]
fn writes_persist_only_the_written_domain() {
    let (_temp, config) = file_config();
    let session = fresh_session(&config);
    session.enter_client_phase();

    session.accessor::<Cart>().set_data(|_| vec![cart_item(1, 1)]);

    let keys = session.storage().keys().unwrap();
    assert_eq!(keys, vec!["tenant:cart".to_string()]);
}

#[test]
fn reset_clears_across_sessions() {
    let (_temp, config) = file_config();
    {
        let session = fresh_session(&config);
        session.enter_client_phase();
        let cart = session.accessor::<Cart>();
        cart.set_data(|_| vec![cart_item(1, 1)]);
        cart.reset();
    }

    let session = fresh_session(&config);
    session.enter_client_phase();
    assert_eq!(session.accessor::<Cart>().restore(), RestoreOutcome::Absent);
    assert!(session.storage().keys().unwrap().is_empty());
}

#[test]
fn payload_does_not_replace_saved_cart() {
    let (_temp, config) = file_config();
    {
        let session = fresh_session(&config);
        session.enter_client_phase();
        session.accessor::<Cart>().set_data(|_| vec![cart_item(1, 2)]);
    }

    let session = fresh_session(&config);
    session.enter_client_phase();
    let report = SeedPayload::new()
        .with::<Cart>(&vec![cart_item(9, 1)])
        .unwrap()
        .apply(&session);

    assert_eq!(report.outcome(DomainKey::Cart), Some(SeedOutcome::Conflict));
    let product_ids: Vec<u64> = session
        .snapshot()
        .cart
        .iter()
        .map(|item| item.product_id)
        .collect();
    assert_eq!(product_ids, vec![1]);
}

#[test]
fn direct_seed_restores_first() {
    let (_temp, config) = file_config();
    {
        let session = fresh_session(&config);
        session.enter_client_phase();
        session
            .accessor::<Briefcase>()
            .set_data(|_| vec![saved("mine")]);
    }

    let session = fresh_session(&config);
    session.enter_client_phase();
    let briefcase = session.accessor::<Briefcase>();

    assert_eq!(briefcase.seed(vec![saved("server")]), SeedOutcome::Conflict);
    assert_eq!(*briefcase.data(), vec![saved("mine")]);
}
