// tests/digest_tree.rs

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use packdag::digest::{TreeDigest, hash_tree};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn digest_is_stable_across_calls() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/a.txt", "hello");
    write(dir.path(), "src/b.txt", "world");

    let first = hash_tree(dir.path()).await.unwrap();
    let second = hash_tree(dir.path()).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn digest_is_independent_of_creation_order() {
    let forward = tempdir().unwrap();
    write(forward.path(), "src/a.txt", "hello");
    write(forward.path(), "src/b.txt", "world");

    let reverse = tempdir().unwrap();
    write(reverse.path(), "src/b.txt", "world");
    write(reverse.path(), "src/a.txt", "hello");

    assert_eq!(
        hash_tree(forward.path()).await.unwrap(),
        hash_tree(reverse.path()).await.unwrap()
    );
}

#[tokio::test]
async fn content_change_changes_digest() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/a.txt", "hello");
    write(dir.path(), "src/b.txt", "world");
    let before = hash_tree(dir.path()).await.unwrap();

    write(dir.path(), "src/a.txt", "hellO");
    let after = hash_tree(dir.path()).await.unwrap();

    assert_ne!(before, after);
}

#[tokio::test]
async fn mixed_case_siblings_hash_deterministically() {
    // "a.txt" and "A.txt" lowercase to the same key; the case-sensitive
    // tie-break keeps the order reproducible regardless of creation order.
    let forward = tempdir().unwrap();
    write(forward.path(), "a.txt", "lower");
    write(forward.path(), "A.txt", "upper");

    let reverse = tempdir().unwrap();
    write(reverse.path(), "A.txt", "upper");
    write(reverse.path(), "a.txt", "lower");

    assert_eq!(
        hash_tree(forward.path()).await.unwrap(),
        hash_tree(reverse.path()).await.unwrap()
    );
}

#[tokio::test]
async fn excluded_files_do_not_affect_the_digest() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/a.txt", "hello");
    write(dir.path(), "build.log", "first run");

    let tree = TreeDigest::new(dir.path()).exclude(["*.log"]).unwrap();
    let before = tree.compute().await.unwrap();

    write(dir.path(), "build.log", "second run");
    assert_eq!(before, tree.compute().await.unwrap());

    write(dir.path(), "src/a.txt", "changed");
    assert_ne!(before, tree.compute().await.unwrap());
}

#[tokio::test]
async fn digest_store_directory_is_not_hashed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/a.txt", "hello");
    let before = hash_tree(dir.path()).await.unwrap();

    // A store rooted inside the tracked tree must not invalidate it.
    write(dir.path(), ".packdag/digests", "compile ui deadbeef");
    assert_eq!(before, hash_tree(dir.path()).await.unwrap());
}

#[tokio::test]
async fn empty_directories_contribute_nothing() {
    let with_dirs = tempdir().unwrap();
    write(with_dirs.path(), "a.txt", "hello");
    fs::create_dir_all(with_dirs.path().join("empty/nested")).unwrap();

    let flat = tempdir().unwrap();
    write(flat.path(), "a.txt", "hello");

    assert_eq!(
        hash_tree(with_dirs.path()).await.unwrap(),
        hash_tree(flat.path()).await.unwrap()
    );
}
