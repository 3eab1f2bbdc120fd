// tests/digest_gate.rs

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use tempfile::tempdir;

use packdag::digest::{DigestGate, FileDigestStore, MemoryDigestStore, TreeDigest};

#[tokio::test]
async fn missing_stored_digest_counts_as_changed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    let tree = TreeDigest::new(dir.path());
    let mut gate = DigestGate::new("compile ui", tree, MemoryDigestStore::new());

    assert!(!gate.is_unchanged().await.unwrap());
    gate.commit().unwrap();
    assert!(gate.is_unchanged().await.unwrap());
}

#[tokio::test]
async fn change_after_commit_is_detected() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    let tree = TreeDigest::new(dir.path());
    let mut gate = DigestGate::new("compile ui", tree, MemoryDigestStore::new());

    gate.is_unchanged().await.unwrap();
    gate.commit().unwrap();

    fs::write(dir.path().join("a.txt"), "changed").unwrap();
    assert!(!gate.is_unchanged().await.unwrap());
}

#[tokio::test]
async fn commit_without_a_computed_digest_is_an_error() {
    let dir = tempdir().unwrap();
    let tree = TreeDigest::new(dir.path());
    let mut gate = DigestGate::new("compile ui", tree, MemoryDigestStore::new());

    assert!(gate.commit().is_err());
}

#[tokio::test]
async fn failed_step_is_retried_on_the_next_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    let tree = TreeDigest::new(dir.path());
    let store = FileDigestStore::new(dir.path());
    let mut gate = DigestGate::new("compile ui", tree, store);

    let runs = Arc::new(AtomicUsize::new(0));

    // First attempt fails: nothing is persisted.
    let result = gate
        .refresh_with(|| async { Err(anyhow!("yarn fell over")) })
        .await;
    assert!(result.is_err());

    // Second attempt runs the step again (the tree still counts as
    // changed) and persists on success.
    {
        let runs = runs.clone();
        gate.refresh_with(|| async move {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Third attempt is skipped: the stored digest matches.
    {
        let runs = runs.clone();
        gate.refresh_with(|| async move {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stored_digest_survives_gate_reconstruction() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    {
        let tree = TreeDigest::new(dir.path());
        let mut gate =
            DigestGate::new("compile ui", tree, FileDigestStore::new(dir.path()));
        gate.is_unchanged().await.unwrap();
        gate.commit().unwrap();
    }

    // A fresh gate over the same store sees the persisted digest.
    let tree = TreeDigest::new(dir.path());
    let mut gate = DigestGate::new("compile ui", tree, FileDigestStore::new(dir.path()));
    assert!(gate.is_unchanged().await.unwrap());
}
