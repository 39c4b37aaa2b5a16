//! Integration tests for Tree mkdir operations

mod common;

use tessera::prelude::*;

#[tokio::test]
async fn test_mkdir() {
    let (root, _, _temp) = common::setup_test_env().await;

    let root = root.mkdir("/test_dir").await.unwrap();

    let items = root.ls("/").await.unwrap();
    assert_eq!(items.len(), 1);
    assert!(!items["test_dir"].is_file);
    assert!(root.ls("/test_dir").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mkdir_nested() {
    let (root, _, _temp) = common::setup_test_env().await;

    let root = root.mkdir("/a/b/c").await.unwrap();

    assert!(root.exists("/a").await);
    assert!(root.exists("/a/b").await);
    assert!(root.exists("/a/b/c").await);
    assert_eq!(root.skeleton()["a"].children["b"].children.len(), 1);
    common::assert_consistent(&root).await;
}

#[tokio::test]
async fn test_mkdir_existing_fails() {
    let (root, _, _temp) = common::setup_test_env().await;

    let root = root.mkdir("/dir").await.unwrap();
    assert_eq!(
        common::path_kind(root.mkdir("/dir").await),
        InvalidPathKind::AlreadyExists
    );

    let root = root.add("/file", b"x".to_vec()).await.unwrap();
    assert_eq!(
        common::path_kind(root.mkdir("/file").await),
        InvalidPathKind::AlreadyExists
    );
}

#[tokio::test]
async fn test_mkdir_through_file_fails() {
    let (root, _, _temp) = common::setup_test_env().await;

    let root = root.add("/file", b"x".to_vec()).await.unwrap();
    assert_eq!(
        common::path_kind(root.mkdir("/file/dir").await),
        InvalidPathKind::NotADirectory
    );
}

#[tokio::test]
async fn test_mkdir_root_fails() {
    let (root, _, _temp) = common::setup_test_env().await;

    assert_eq!(common::path_kind(root.mkdir("/").await), InvalidPathKind::Root);
}

#[tokio::test]
async fn test_mkdir_keeps_siblings() {
    let (root, _, _temp) = common::setup_test_env().await;

    let root = root.add("/a/existing.txt", b"x".to_vec()).await.unwrap();
    let root = root.mkdir("/a/new").await.unwrap();

    let items = root.ls("/a").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(root.cat("/a/existing.txt").await.unwrap().as_ref(), b"x");
}
