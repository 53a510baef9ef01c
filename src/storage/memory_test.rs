use super::*;

#[test]
fn set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("travelmaps:token").unwrap(), None);
    store.set("travelmaps:token", "abc").unwrap();
    assert_eq!(store.get("travelmaps:token").unwrap().as_deref(), Some("abc"));
    store.remove("travelmaps:token").unwrap();
    assert!(store.is_empty());
    // Removing again is fine.
    store.remove("travelmaps:token").unwrap();
}

#[test]
fn quota_rejects_oversized_write_and_keeps_previous_value() {
    let store = MemoryStore::with_quota(20);
    store.set("k", "small").unwrap();
    let err = store.set("k", "this value is far too large").unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { limit: 20, .. }));
    assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
}

#[test]
fn quota_counts_replaced_value_once() {
    let store = MemoryStore::with_quota(10);
    store.set("k", "123456789").unwrap();
    store.set("k", "987654321").unwrap();
    assert_eq!(store.len(), 1);
}
