//! Shared test utilities for tree integration tests
#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;
use tessera::prelude::*;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness; `RUST_LOG` picks the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Set up a test environment with an empty public root over
///  a file-backed blob store
pub async fn setup_test_env() -> (Tree, BlobsStore, TempDir) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let blob_path = temp_dir.path().join("blobs");
    let blobs = BlobsStore::fs(&blob_path).await.unwrap();

    let root = Tree::empty(Blocks::public(Arc::new(blobs.clone())), SemVer::V1);
    (root, blobs, temp_dir)
}

/// Same as [`setup_test_env`] but the root is private; the root
///  key is returned alongside
pub async fn setup_private_env() -> (Tree, Secret, BlobsStore, TempDir) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let blobs = BlobsStore::fs(&temp_dir.path().join("blobs")).await.unwrap();

    let key = Secret::generate().unwrap();
    let root = Tree::empty(
        Blocks::private(Arc::new(blobs.clone()), key.clone()),
        SemVer::V1,
    );
    (root, key, blobs, temp_dir)
}

/// An empty public root over an in-memory store the test can poke at
pub fn memory_env() -> (Tree, MemoryBlockStore) {
    init_tracing();
    let store = MemoryBlockStore::new();
    let root = Tree::empty(Blocks::public(Arc::new(store.clone())), SemVer::V1);
    (root, store)
}

/// Assert that every directory reachable from `tree` names the same
///  entries in its links, skeleton and children index
pub async fn assert_consistent(tree: &Tree) {
    let mut pending = vec![tree.clone()];
    while let Some(dir) = pending.pop() {
        let links: Vec<_> = dir.links().keys().cloned().collect();
        let skeleton: Vec<_> = dir.skeleton().keys().cloned().collect();
        let children: Vec<_> = dir.children().keys().cloned().collect();
        assert_eq!(links, skeleton, "skeleton out of step with links");
        assert_eq!(links, children, "children out of step with links");

        for name in links {
            let link = dir.find_link(&name).unwrap();
            assert_eq!(dir.skeleton()[&name].cid, link.cid);
            assert_eq!(dir.children()[&name].name, name);
            if let Some(Node::Tree(sub)) = dir.get_direct_child(&name).await.unwrap() {
                assert_eq!(&dir.skeleton()[&name].children, sub.skeleton());
                pending.push(sub);
            }
        }
    }
}

pub fn path_kind<T: std::fmt::Debug>(result: Result<T, FsError>) -> InvalidPathKind {
    result
        .unwrap_err()
        .path_kind()
        .expect("expected an invalid path error")
}
