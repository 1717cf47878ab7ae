// Local blob store tests
// These tests verify the key -> JSON blob persistence collaborators use

mod common;
use common::setup_logging;

use serde::{Deserialize, Serialize};
use tempfile::tempdir;

use quadchat::storage::{LocalStore, StorageError};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Favorites {
    post_ids: Vec<String>,
    authored_count: u32,
}

/// Test a blob survives a put/get round trip
#[test]
fn test_blob_round_trip() {
    setup_logging();

    println!("\n=== Testing blob store round trip ===");

    let dir = tempdir().expect("temp dir should be available");
    let store = LocalStore::at(dir.path()).expect("store should open");

    let favorites = Favorites {
        post_ids: vec!["p1".to_string(), "p7".to_string()],
        authored_count: 3,
    };
    store.put("favorites", &favorites).expect("put should succeed");

    let loaded: Option<Favorites> = store.get("favorites").expect("get should succeed");
    assert_eq!(loaded, Some(favorites));
    println!("✅ Blob round-tripped through {}", store.root().display());

    // A second store on the same directory sees the same blob
    let reopened = LocalStore::at(dir.path()).expect("store should reopen");
    let again: Option<Favorites> = reopened.get("favorites").expect("get should succeed");
    assert!(again.is_some());

    println!("=== Blob round trip test completed ===\n");
}

/// Test missing keys and removal
#[test]
fn test_missing_and_removed_keys() {
    setup_logging();

    let dir = tempdir().expect("temp dir should be available");
    let store = LocalStore::at(dir.path()).expect("store should open");

    let missing: Option<String> = store.get("never-written").expect("get should succeed");
    assert_eq!(missing, None);

    store
        .put("last-chat", &"7".to_string())
        .expect("put should succeed");
    store.remove("last-chat").expect("remove should succeed");
    let gone: Option<String> = store.get("last-chat").expect("get should succeed");
    assert_eq!(gone, None);

    // Removing a key that was never written is fine
    store.remove("last-chat").expect("double remove should succeed");
    println!("✅ Missing keys read as None; remove is idempotent");
}

/// Test that keys cannot escape the store directory
#[test]
fn test_invalid_keys_are_rejected() {
    setup_logging();

    let dir = tempdir().expect("temp dir should be available");
    let store = LocalStore::at(dir.path()).expect("store should open");

    for bad in ["", "../escape", "a/b", "dot.dot"] {
        let result = store.put(bad, &0u32);
        assert!(
            matches!(result, Err(StorageError::InvalidKey(_))),
            "Key {:?} should be rejected",
            bad
        );
    }
    println!("✅ Path-escaping keys are rejected");
}
