//! Snapshot Store Tests
//!
//! Tests for:
//! - Monotone versioning in both store implementations
//! - File store round trip and latest-version resolution

#![cfg(not(target_arch = "wasm32"))]

use cel::collab::{FileStore, MemoryStore, SnapshotStore};
use cel::document::samples::{sample_document, seed_document};

#[tokio::test]
async fn memory_store_versions_are_monotone() {
    let store = MemoryStore::new();
    let doc = seed_document("proj_m", "Mem");

    assert!(store.load("proj_m").await.unwrap().is_none());
    assert_eq!(store.save("proj_m", &doc).await.unwrap(), 1);
    assert_eq!(store.save("proj_m", &doc).await.unwrap(), 2);
    assert_eq!(store.version("proj_m"), 2);

    let loaded = store.load("proj_m").await.unwrap().unwrap();
    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.name, "Mem");
}

#[tokio::test]
async fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let doc = sample_document("proj_f");

    assert!(store.load("proj_f").await.unwrap().is_none());
    assert_eq!(store.save("proj_f", &doc).await.unwrap(), 1);
    assert_eq!(store.save("proj_f", &doc).await.unwrap(), 2);

    let loaded = store.load("proj_f").await.unwrap().unwrap();
    assert_eq!(loaded.version, 2);
    // Everything but the stamped version round-trips exactly.
    let mut expected = doc.clone();
    expected.version = 2;
    assert_eq!(loaded, expected);
}

#[tokio::test]
async fn file_store_projects_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let doc_a = seed_document("proj_a", "A");
    let doc_b = seed_document("proj_b", "B");

    store.save("proj_a", &doc_a).await.unwrap();
    let version_b = store.save("proj_b", &doc_b).await.unwrap();
    assert_eq!(version_b, 1, "versions are per project");

    let loaded = store.load("proj_b").await.unwrap().unwrap();
    assert_eq!(loaded.name, "B");
}
