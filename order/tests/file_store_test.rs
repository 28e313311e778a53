//! File-backed draft store tests
//!
//! Every test works inside its own temporary directory.

#![allow(clippy::unwrap_used)]

use hanamo_order::draft_store::{DraftStore, FileDraftStore, SerializedDraft};
use hanamo_order::{
    BaseKind, Config, MilkKind, OrderEnvironment, OrderSession, SequenceRandom, ToppingKind,
};
use hanamo_testing::test_clock;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn file_session(store: &FileDraftStore) -> OrderSession {
    OrderSession::start(OrderEnvironment::new(
        Arc::new(store.clone()),
        Arc::new(SequenceRandom::new(vec![3, 1, 4, 1])),
        Arc::new(test_clock()),
    ))
}

#[test]
fn load_from_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileDraftStore::new(dir.path(), "hanamo_draft");

    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_creates_directory_and_file() {
    let dir = TempDir::new().unwrap();
    let store = FileDraftStore::new(dir.path().join("nested").join("drafts"), "hanamo_draft");

    store.save(SerializedDraft::from_raw(r#"{"name":"Mina"}"#)).unwrap();

    assert_eq!(store.path(), dir.path().join("nested/drafts/hanamo_draft.json"));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), r#"{"name":"Mina"}"#);
    assert_eq!(
        store.load().unwrap().unwrap().as_str(),
        r#"{"name":"Mina"}"#
    );
}

#[test]
fn save_replaces_previous_draft_without_leftovers() {
    let dir = TempDir::new().unwrap();
    let store = FileDraftStore::new(dir.path(), "kiosk");

    store.save(SerializedDraft::from_raw("first")).unwrap();
    store.save(SerializedDraft::from_raw("second")).unwrap();

    assert_eq!(store.load().unwrap().unwrap().as_str(), "second");
    let files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec![std::ffi::OsString::from("kiosk.json")]);
}

#[test]
fn clear_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = FileDraftStore::new(dir.path(), "hanamo_draft");

    store.clear().unwrap();
    store.save(SerializedDraft::from_raw("{}")).unwrap();
    store.clear().unwrap();
    store.clear().unwrap();

    assert!(!store.path().exists());
}

#[test]
fn keys_do_not_collide() {
    let dir = TempDir::new().unwrap();
    let a = FileDraftStore::new(dir.path(), "a");
    let b = FileDraftStore::new(dir.path(), "b");

    a.save(SerializedDraft::from_raw("for a")).unwrap();

    assert!(b.load().unwrap().is_none());
}

#[test]
fn unreadable_location_is_an_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let store = FileDraftStore::new(&blocker, "hanamo_draft");

    assert!(store.save(SerializedDraft::from_raw("{}")).is_err());
    assert!(store.load().is_err());
}

#[test]
fn session_draft_survives_restart_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = FileDraftStore::new(dir.path(), "hanamo_draft");

    {
        let mut session = file_session(&store);
        session.set_name("Mina").unwrap();
        session.set_phone("555-123-4567").unwrap();
        session.set_base(BaseKind::Matcha).unwrap();
        session.set_milk(MilkKind::Oat).unwrap();
        session.toggle_topping(ToppingKind::Egg).unwrap();
    }

    let mut session = file_session(&store);
    assert_eq!(session.draft().name, "Mina");
    assert_eq!(session.draft().milk, MilkKind::Oat);
    assert!(session.draft().has_topping(ToppingKind::Egg));

    assert_eq!(session.submit().unwrap().order_id.as_str(), "HANA-DBEB");
    session.reset();
    assert!(!store.path().exists());
}

#[test]
fn session_survives_blocked_storage() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let mut session = file_session(&FileDraftStore::new(&blocker, "hanamo_draft"));

    session.set_name("Mina").unwrap();
    session.set_phone("555-123-4567").unwrap();
    session.set_base(BaseKind::VietCoffee).unwrap();

    assert!(session.submit().is_ok());
}

#[test]
fn configured_file_backend_uses_draft_dir() {
    let dir = TempDir::new().unwrap();
    let draft_dir = dir.path().to_string_lossy().into_owned();
    let config = Config::from_lookup(|name| match name {
        "HANAMO_DRAFT_DIR" => Some(draft_dir.clone()),
        "HANAMO_DRAFT_KEY" => Some("counter_2".to_string()),
        _ => None,
    });

    config
        .draft_store()
        .save(SerializedDraft::from_raw("{}"))
        .unwrap();

    assert!(dir.path().join("counter_2.json").exists());
}
