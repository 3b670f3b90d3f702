/// Integration tests for the session store
///
/// These tests exercise the file-backed tiers against a temporary directory
/// and the in-memory degradation path against a backend that always fails.

use flatchat_shared::models::session::SESSION_RECORD_KEY;
use flatchat_shared::models::SessionPatch;
use flatchat_shared::session::{
    FileStorage, MemoryStorage, SessionStore, StorageBackend, StorageError, StorageResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Backend that rejects every operation
#[derive(Default)]
struct BrokenStorage {
    calls: AtomicUsize,
}

impl StorageBackend for BrokenStorage {
    fn read(&self, _key: &str) -> StorageResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable("disabled".to_string()))
    }

    fn write(&self, _key: &str, _value: &str) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable("disabled".to_string()))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable("disabled".to_string()))
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

#[test]
fn test_file_backed_session_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let store = SessionStore::open(dir.path());
        store.set(SessionPatch::login("u1", "t1").with_username("aoife"));
        store.set(SessionPatch::household("h1"));
        store.remember_household_id("h1");
    }

    let reopened = SessionStore::open(dir.path());
    let context = reopened.get().expect("session should persist");
    assert_eq!(context.user_id, "u1");
    assert_eq!(context.household_id.as_deref(), Some("h1"));
    assert_eq!(
        reopened.durable_household().household_id.as_deref(),
        Some("h1")
    );
    assert!(!reopened.is_degraded());
}

#[test]
fn test_set_is_visible_to_a_second_store_immediately() {
    let dir = TempDir::new().unwrap();
    let first = SessionStore::open(dir.path());
    let second = SessionStore::open(dir.path());

    first.set(SessionPatch::login("u1", "t1"));
    assert_eq!(second.get().map(|c| c.user_id), Some("u1".to_string()));

    first.set(SessionPatch::household("h9"));
    assert_eq!(
        second.get().and_then(|c| c.household_id),
        Some("h9".to_string())
    );
}

#[test]
fn test_malformed_file_reads_as_absent() {
    let dir = TempDir::new().unwrap();
    let session = FileStorage::open(dir.path().join("session")).unwrap();
    session.write(SESSION_RECORD_KEY, "{\"userID\": ").unwrap();

    let store = SessionStore::open(dir.path());
    assert!(store.get().is_none());

    // A subsequent set replaces the broken blob.
    store.set(SessionPatch::login("u1", "t1"));
    assert!(store.get().is_some());
}

#[test]
fn test_tokens_without_household_are_valid() {
    let store = SessionStore::in_memory();
    store.set(SessionPatch::login("u1", "t1"));

    let context = store.get().unwrap();
    assert!(context.household_id.is_none());
}

#[test]
fn test_household_without_tokens_is_not_a_session() {
    let store = SessionStore::in_memory();
    store.set(SessionPatch::household("h1"));

    assert!(store.get().is_none());
    assert_eq!(store.get_record().household_id.as_deref(), Some("h1"));
}

#[test]
fn test_unavailable_storage_degrades_to_memory() {
    let broken = Arc::new(BrokenStorage::default());
    let store = SessionStore::new(broken.clone(), Arc::new(MemoryStorage::new()));

    assert!(store.get().is_none());
    assert!(store.is_degraded());

    store.set(SessionPatch::login("u1", "t1"));
    store.set(SessionPatch::household("h1"));

    let context = store.get().unwrap();
    assert_eq!(context.household_id.as_deref(), Some("h1"));

    // Only the first failure reaches the backend.
    assert_eq!(broken.calls.load(Ordering::SeqCst), 1);

    store.clear();
    assert!(store.get().is_none());
}

#[test]
fn test_degradation_keeps_last_known_record() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path());
    store.set(SessionPatch::login("u1", "t1"));

    // Replace the session directory with a plain file so reads fail.
    let session_dir = dir.path().join("session");
    std::fs::remove_dir_all(&session_dir).unwrap();
    std::fs::write(&session_dir, b"").unwrap();

    store.set(SessionPatch::household("h1"));
    let context = store.get().unwrap();
    assert_eq!(context.user_id, "u1");
    assert_eq!(context.household_id.as_deref(), Some("h1"));
    assert!(store.is_degraded());
}
