use std::sync::Arc;

use erp_console::{
    UserProfile,
    session::{FileStore, KeyValueStore, MemoryStore, SessionStore},
};
use uuid::Uuid;

// --- Helpers ---

fn profile(role: &str) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        username: "mrivas".to_string(),
        first_name: "Marta".to_string(),
        last_name: "Rivas".to_string(),
        role: role.to_string(),
    }
}

fn memory_store() -> (SessionStore, Arc<MemoryStore>) {
    let kv = Arc::new(MemoryStore::new());
    (SessionStore::new(kv.clone()), kv)
}

// --- Round Trip ---

#[test]
fn set_then_get_round_trips() {
    let (store, _) = memory_store();
    let user = profile("finance");

    store.set("token-abc", Some("refresh-xyz"), &user);

    let session = store.get().expect("session should be present");
    assert_eq!(session.token, "token-abc");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-xyz"));
    assert_eq!(session.user, user);
}

#[test]
fn refresh_token_is_optional() {
    let (store, _) = memory_store();
    store.set("token-abc", None, &profile("sales"));

    let session = store.get().expect("session should be present");
    assert_eq!(session.refresh_token, None);
}

#[test]
fn set_replaces_a_previous_refresh_token() {
    let (store, _) = memory_store();
    store.set("t1", Some("r1"), &profile("sales"));
    // A later login without a refresh token must not leave the stale one.
    store.set("t2", None, &profile("sales"));

    let session = store.get().expect("session should be present");
    assert_eq!(session.token, "t2");
    assert_eq!(session.refresh_token, None);
}

// --- Empty / Cleared States ---

#[test]
fn empty_store_yields_no_session() {
    let (store, _) = memory_store();
    assert!(store.get().is_none());
    assert!(!store.has_token());
    assert!(store.token().is_none());
}

#[test]
fn clear_removes_everything() {
    let (store, kv) = memory_store();
    store.set("token-abc", Some("refresh-xyz"), &profile("admin"));
    store.clear();

    assert!(store.get().is_none());
    assert!(!store.has_token());
    assert!(kv.get("accessToken").is_none());
    assert!(kv.get("user").is_none());
    assert!(kv.get("refreshToken").is_none());
}

#[test]
fn empty_token_counts_as_no_token() {
    let (store, kv) = memory_store();
    kv.set("accessToken", "");
    assert!(!store.has_token());
    assert!(store.token().is_none());
    assert!(store.get().is_none());
}

// --- Corrupt Cache Resilience ---

#[test]
fn corrupt_user_payload_is_equivalent_to_no_session() {
    let (store, kv) = memory_store();
    kv.set("accessToken", "token-abc");
    kv.set("user", "{not valid json");

    // Must not panic, must behave as if no session exists.
    assert!(store.get().is_none());
    // The raw token is still reported: the hydrator verifies it remotely even
    // when the profile cache is unreadable.
    assert_eq!(store.token().as_deref(), Some("token-abc"));
    assert!(store.has_token());
}

#[test]
fn token_without_user_record_is_no_session() {
    let (store, kv) = memory_store();
    kv.set("accessToken", "token-abc");
    assert!(store.get().is_none());
}

#[test]
fn unknown_role_string_still_deserializes() {
    let (store, _) = memory_store();
    let user = profile("becario");
    store.set("token-abc", None, &user);

    let session = store.get().expect("session should be present");
    assert_eq!(session.user.role, "becario");
    // The role resolves to nothing and will fail gated checks downstream.
    assert_eq!(session.user.resolved_role(), None);
}

// --- File-Backed Store ---

#[test]
fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");

    {
        let store = SessionStore::new(Arc::new(FileStore::open(&path)));
        store.set("token-abc", Some("refresh-xyz"), &profile("management"));
    }

    let reopened = SessionStore::new(Arc::new(FileStore::open(&path)));
    let session = reopened.get().expect("session should survive reopen");
    assert_eq!(session.token, "token-abc");
    assert_eq!(session.user.role, "management");
}

#[test]
fn file_store_tolerates_a_corrupt_backing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    std::fs::write(&path, "##### not json #####").expect("seed corrupt file");

    let store = SessionStore::new(Arc::new(FileStore::open(&path)));
    assert!(store.get().is_none());

    // Writing after corruption recovers the file.
    store.set("token-abc", None, &profile("admin"));
    let reopened = SessionStore::new(Arc::new(FileStore::open(&path)));
    assert!(reopened.get().is_some());
}

#[test]
fn file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(Arc::new(FileStore::open(dir.path().join("absent.json"))));
    assert!(store.get().is_none());
    assert!(!store.has_token());
}
