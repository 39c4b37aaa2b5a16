//! Integration tests for writing trees out and loading them back

mod common;

use std::sync::Arc;

use tessera::prelude::*;
use tessera::protocol;
use tessera::types::NodeInfo;

#[tokio::test]
async fn test_put_and_load() {
    let (root, blobs, _temp) = common::setup_test_env().await;

    let root = root.add("/docs/a.txt", b"alpha".to_vec()).await.unwrap();
    let root = root.add("/docs/b.txt", b"beta".to_vec()).await.unwrap();
    let root = root.mkdir("/empty").await.unwrap();
    let cid = root.put().await.unwrap();

    let loaded = Tree::from_cid(Blocks::public(Arc::new(blobs.clone())), &cid)
        .await
        .unwrap();
    assert_eq!(loaded.links(), root.links());
    assert_eq!(loaded.metadata(), root.metadata());
    assert_eq!(loaded.skeleton(), root.skeleton());
    assert_eq!(loaded.children(), root.children());
    assert_eq!(loaded.header().size, blobs.size(&cid).await.unwrap());
    assert_eq!(loaded.cat("/docs/b.txt").await.unwrap().as_ref(), b"beta");
    assert!(loaded.ls("/empty").await.unwrap().is_empty());

    // loading and writing back changes nothing
    assert_eq!(loaded.put().await.unwrap(), cid);
}

#[tokio::test]
async fn test_put_is_idempotent() {
    let (root, _, _temp) = common::setup_test_env().await;

    let root = root.add("/x.txt", b"x".to_vec()).await.unwrap();
    let first = root.put_detailed().await.unwrap();
    let second = root.put_detailed().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_tree_round_trip() {
    let (root, _) = common::memory_env();
    let root = root.add("/a/b.txt", b"b".to_vec()).await.unwrap();
    let blocks = root.blocks().clone();

    let details = protocol::put_tree(
        &blocks,
        root.links(),
        root.skeleton(),
        root.children(),
        root.metadata(),
    )
    .await
    .unwrap();
    let again = protocol::put_tree(
        &blocks,
        root.links(),
        root.skeleton(),
        root.children(),
        root.metadata(),
    )
    .await
    .unwrap();
    assert_eq!(details.cid, again.cid);

    let NodeInfo::Tree(info) = protocol::get(&blocks, &details.cid).await.unwrap() else {
        panic!("expected a tree");
    };
    assert_eq!(&info.metadata, root.metadata());
    assert_eq!(&info.skeleton, root.skeleton());
    assert_eq!(&info.children, root.children());
    assert_eq!(info.userland, details.userland);
    assert_eq!(&protocol::get_links(&blocks, &info.userland).await.unwrap(), root.links());
}

#[tokio::test]
async fn test_file_round_trip() {
    let (root, _) = common::memory_env();
    let blocks = root.blocks().clone();
    let metadata = Metadata::empty(true, SemVer::V1).with_name("data.bin");
    let content: Vec<u8> = (0..=255).collect();

    let details = protocol::put_file(&blocks, &content, &metadata).await.unwrap();

    let NodeInfo::File(info) = protocol::get(&blocks, &details.cid).await.unwrap() else {
        panic!("expected a file");
    };
    assert_eq!(info.metadata, metadata);
    assert_eq!(blocks.get_raw(&info.userland).await.unwrap().as_ref(), &content[..]);
}

#[tokio::test]
async fn test_siblings_are_not_rewritten() {
    let (root, store) = common::memory_env();

    let mut root = root.add("/other/untouched.txt", b"u".to_vec()).await.unwrap();
    for n in 0..5 {
        root = root
            .add(format!("/dir/file{}.txt", n), format!("content {}", n).into_bytes())
            .await
            .unwrap();
    }
    root.put().await.unwrap();

    let dir_before = root.get("/dir").await.unwrap().unwrap().into_tree().unwrap();
    let other_before = root.find_link("other").unwrap().cid;
    let blocks_before = store.len();

    let root = root.add("/dir/file2.txt", b"changed".to_vec()).await.unwrap();
    root.put().await.unwrap();

    let dir_after = root.get("/dir").await.unwrap().unwrap().into_tree().unwrap();
    for n in [0, 1, 3, 4] {
        let name = format!("file{}.txt", n);
        assert_eq!(
            dir_before.find_link(&name).unwrap().cid,
            dir_after.find_link(&name).unwrap().cid
        );
    }
    assert_ne!(
        dir_before.find_link("file2.txt").unwrap().cid,
        dir_after.find_link("file2.txt").unwrap().cid
    );
    assert_eq!(root.find_link("other").unwrap().cid, other_before);

    // at most the changed file, its directory and the root
    assert!(store.len() - blocks_before <= 3 + 5 + 5);
}

#[tokio::test]
async fn test_file_is_not_a_tree() {
    let (root, _) = common::memory_env();
    let blocks = root.blocks().clone();
    let file = File::create(blocks.clone(), b"leaf".to_vec(), SemVer::V1);
    let cid = file.put().await.unwrap();

    let result = Tree::from_cid(blocks.clone(), &cid).await;
    assert!(matches!(result, Err(FsError::WrongNodeKind { expected: "tree", .. })));

    let tree_cid = root.put().await.unwrap();
    let result = File::from_cid(blocks, &tree_cid).await;
    assert!(matches!(result, Err(FsError::WrongNodeKind { expected: "file", .. })));
}
