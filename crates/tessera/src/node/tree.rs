use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::{File, Node, Persist};
use crate::blocks::Blocks;
use crate::crypto::Secret;
use crate::error::{FsError, InvalidPathKind};
use crate::link::{self, Link, Links};
use crate::linked_data::Cid;
use crate::path;
use crate::protocol;
use crate::store::BlockStore;
use crate::types::{
    Children, Header, Metadata, NodeInfo, NodeKind, PutDetails, SemVer, Skeleton, SkeletonInfo,
    TreeInfo,
};

/// What can be placed at a path: a whole directory, or the
///  content of a file
#[derive(Debug, Clone)]
pub enum Child {
    Tree(Tree),
    Content(Bytes),
}

impl From<Tree> for Child {
    fn from(tree: Tree) -> Self {
        Child::Tree(tree)
    }
}

impl From<Bytes> for Child {
    fn from(content: Bytes) -> Self {
        Child::Content(content)
    }
}

impl From<Vec<u8>> for Child {
    fn from(content: Vec<u8>) -> Self {
        Child::Content(content.into())
    }
}

impl From<&[u8]> for Child {
    fn from(content: &[u8]) -> Self {
        Child::Content(Bytes::copy_from_slice(content))
    }
}

/// A directory.
///
/// Holds its immediate entries as links together with the decoded header:
///  metadata, the recursive skeleton and the children metadata index. The
///  last two are kept in step with the links by every mutation.
#[derive(Debug, Clone)]
pub struct Tree {
    blocks: Blocks,
    links: Links,
    header: Header,
}

impl Tree {
    /// A new, empty directory, not yet written anywhere
    pub fn empty(blocks: Blocks, version: SemVer) -> Self {
        Self {
            blocks,
            links: Links::new(),
            header: Header::new(Metadata::empty(false, version)),
        }
    }

    pub async fn from_cid(blocks: Blocks, cid: &Cid) -> Result<Self, FsError> {
        match protocol::get(&blocks, cid).await? {
            NodeInfo::Tree(info) => Self::from_info(blocks, info).await,
            NodeInfo::File(_) => Err(FsError::WrongNodeKind {
                cid: *cid,
                expected: "tree",
            }),
        }
    }

    /// Load a private tree given its key in exported form
    pub async fn from_cid_with_key(
        store: Arc<dyn BlockStore>,
        cid: &Cid,
        key: &str,
    ) -> Result<Self, FsError> {
        let blocks = Blocks::private(store, Secret::from_hex(key)?);
        Self::from_cid(blocks, cid).await
    }

    pub async fn from_info(blocks: Blocks, info: TreeInfo) -> Result<Self, FsError> {
        let header = Header {
            metadata: info.metadata,
            size: info.size,
            skeleton: info.skeleton,
            children: info.children,
        };
        Self::from_header_and_userland(blocks, header, &info.userland).await
    }

    /// Rebuild a tree from an already decoded header, fetching only
    ///  the link set stored at `userland`
    pub async fn from_header_and_userland(
        blocks: Blocks,
        header: Header,
        userland: &Cid,
    ) -> Result<Self, FsError> {
        let links = protocol::get_links(&blocks, userland).await?;
        Ok(Self {
            blocks,
            links,
            header,
        })
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.header.skeleton
    }

    pub fn children(&self) -> &Children {
        &self.header.children
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn find_link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    pub(crate) fn named(self, name: &str) -> Self {
        if self.header.metadata.name == name {
            return self;
        }
        let mut header = self.header;
        header.metadata = header.metadata.with_name(name);
        Self { header, ..self }
    }

    /* Path operations */

    /// List the entries of the directory at `path`
    pub async fn ls(&self, path: impl AsRef<Path>) -> Result<Links, FsError> {
        let path = path.as_ref();
        match self.get(path).await? {
            Some(Node::Tree(tree)) => Ok(tree.links),
            Some(Node::File(_)) => Err(invalid(path, InvalidPathKind::NotADirectory)),
            None => Err(invalid(path, InvalidPathKind::NotFound)),
        }
    }

    /// Create an empty directory at `path`, along with any missing parents
    pub async fn mkdir(&self, path: impl AsRef<Path>) -> Result<Tree, FsError> {
        let path = path.as_ref();
        let (parents, name) = path::split_non_empty(path)?;
        if self.get(path).await?.is_some() {
            return Err(invalid(path, InvalidPathKind::AlreadyExists));
        }
        let mut parts = parents;
        parts.push(name.clone());
        let dir = self.empty_child_tree(&name)?;
        self.add_recurse(&parts, Child::Tree(dir), path).await
    }

    /// Content of the file at `path`
    pub async fn cat(&self, path: impl AsRef<Path>) -> Result<Bytes, FsError> {
        let path = path.as_ref();
        match self.get(path).await? {
            Some(Node::File(file)) => Ok(file.content().clone()),
            Some(Node::Tree(_)) => Err(invalid(path, InvalidPathKind::NotAFile)),
            None => Err(invalid(path, InvalidPathKind::NotFound)),
        }
    }

    /// Write a file at `path`, replacing whatever is there and
    ///  creating any missing parents
    pub async fn add(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Bytes>,
    ) -> Result<Tree, FsError> {
        self.add_child(path, Child::Content(content.into())).await
    }

    /// Remove the entry at `path` from its parent
    pub async fn rm(&self, path: impl AsRef<Path>) -> Result<Tree, FsError> {
        let path = path.as_ref();
        let (parents, name) = path::split_non_empty(path)?;
        let parent = match self.get_parts(&parents, path).await? {
            Some(Node::Tree(parent)) => parent,
            Some(Node::File(_)) => return Err(invalid(path, InvalidPathKind::NotADirectory)),
            None => return Err(invalid(path, InvalidPathKind::NotFound)),
        };
        if parent.find_link(&name).is_none() {
            return Err(invalid(path, InvalidPathKind::NotFound));
        }

        let updated = parent.remove_direct_child(&name);
        if parents.is_empty() {
            return Ok(updated);
        }
        self.add_recurse(&parents, Child::Tree(updated), path).await
    }

    /// The node at `path`, or `None` if nothing is there.
    ///  An empty path names this tree itself
    pub async fn get(&self, path: impl AsRef<Path>) -> Result<Option<Node>, FsError> {
        let path = path.as_ref();
        let parts = path::split(path)?;
        self.get_parts(&parts, path).await
    }

    /// Whether anything can be found at `path`.
    ///  Any error on the way counts as not found
    pub async fn exists(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.get(path).await, Ok(Some(_)))
    }

    /// Place a directory or file content at `path`, creating any
    ///  missing parents
    pub async fn add_child(
        &self,
        path: impl AsRef<Path>,
        child: impl Into<Child>,
    ) -> Result<Tree, FsError> {
        let path = path.as_ref();
        let (mut parts, name) = path::split_non_empty(path)?;
        parts.push(name);
        self.add_recurse(&parts, child.into(), path).await
    }

    async fn get_parts(&self, parts: &[String], full: &Path) -> Result<Option<Node>, FsError> {
        let Some((head, rest)) = parts.split_first() else {
            return Ok(Some(Node::Tree(self.clone())));
        };
        match self.get_direct_child(head).await? {
            None => Ok(None),
            Some(node) if rest.is_empty() => Ok(Some(node)),
            Some(Node::Tree(tree)) => Box::pin(tree.get_parts(rest, full)).await,
            Some(Node::File(_)) => Err(invalid(full, InvalidPathKind::NotADirectory)),
        }
    }

    async fn add_recurse(
        &self,
        parts: &[String],
        child: Child,
        full: &Path,
    ) -> Result<Tree, FsError> {
        let Some((name, rest)) = parts.split_first() else {
            return Err(invalid(full, InvalidPathKind::Root));
        };

        let to_add = if rest.is_empty() {
            match child {
                Child::Tree(tree) => Node::Tree(tree),
                Child::Content(content) => {
                    Node::File(self.create_or_update_child_file(name, content).await?)
                }
            }
        } else {
            match self.get_or_create_direct_child(name).await? {
                Node::Tree(next) => Node::Tree(Box::pin(next.add_recurse(rest, child, full)).await?),
                Node::File(_) => return Err(invalid(full, InvalidPathKind::NotADirectory)),
            }
        };

        self.update_direct_child(to_add, name).await
    }

    /* Single-level operations */

    /// Load the entry `name`, if this tree links to one
    pub async fn get_direct_child(&self, name: &str) -> Result<Option<Node>, FsError> {
        let Some(link) = self.find_link(name) else {
            return Ok(None);
        };
        let blocks = self.child_blocks(link)?;
        let node = match protocol::get(&blocks, &link.cid).await? {
            NodeInfo::Tree(info) => Node::Tree(Tree::from_info(blocks, info).await?),
            NodeInfo::File(info) => Node::File(File::from_info(blocks, info).await?),
        };
        Ok(Some(node))
    }

    /// Load the entry `name`, or a new empty directory if there is none
    pub async fn get_or_create_direct_child(&self, name: &str) -> Result<Node, FsError> {
        match self.get_direct_child(name).await? {
            Some(node) => Ok(node),
            None => Ok(Node::Tree(self.empty_child_tree(name)?)),
        }
    }

    /// Write `child` and link it in under `name`, replacing any
    ///  existing entry of that name
    pub async fn update_direct_child(&self, child: Node, name: &str) -> Result<Tree, FsError> {
        let child = child.named(name);
        let child_key = match &child {
            Node::Tree(tree) => tree.blocks.key().cloned(),
            Node::File(file) => file.blocks().key().cloned(),
        };
        if child_key.is_some() != self.blocks.is_private() {
            return Err(FsError::VariantMismatch);
        }

        let details = child.put_detailed().await?;
        let metadata = child.metadata().clone();
        let skeleton = match &child {
            Node::Tree(tree) => tree.header.skeleton.clone(),
            Node::File(_) => Skeleton::new(),
        };

        let link = link::make(name, details.cid, metadata.is_file, details.size)
            .with_mtime(metadata.mtime)
            .with_key(child_key);

        let mut updated = self.clone();
        updated.links.insert(name.to_string(), link);
        updated.header.skeleton.insert(
            name.to_string(),
            SkeletonInfo {
                cid: details.cid,
                userland: details.userland,
                metadata: details.metadata,
                children: skeleton,
            },
        );
        updated.header.children.insert(name.to_string(), metadata);
        updated.header.metadata = updated.header.metadata.touched();
        updated.header.size = 0;
        Ok(updated)
    }

    /// Drop the entry `name`. Removing an absent entry still
    ///  counts as a modification
    pub fn remove_direct_child(&self, name: &str) -> Tree {
        let mut updated = self.clone();
        updated.links.remove(name);
        updated.header.skeleton.remove(name);
        updated.header.children.remove(name);
        updated.header.metadata = updated.header.metadata.touched();
        updated.header.size = 0;
        updated
    }

    /// A new empty directory of the same variant as this one
    pub fn empty_child_tree(&self, name: &str) -> Result<Tree, FsError> {
        let tree = Tree::empty(self.new_child_blocks()?, self.header.metadata.version);
        Ok(tree.named(name))
    }

    /// A new file of the same variant as this one
    pub fn create_child_file(&self, name: &str, content: Bytes) -> Result<File, FsError> {
        let file = File::create(
            self.new_child_blocks()?,
            content,
            self.header.metadata.version,
        );
        Ok(file.named(name))
    }

    async fn create_or_update_child_file(
        &self,
        name: &str,
        content: Bytes,
    ) -> Result<File, FsError> {
        match self.get_direct_child(name).await? {
            Some(Node::File(existing)) => Ok(existing.update_content(content)),
            _ => self.create_child_file(name, content),
        }
    }

    // every private child gets a key of its own
    fn new_child_blocks(&self) -> Result<Blocks, FsError> {
        if self.blocks.is_private() {
            Ok(self.blocks.with_key(Some(Secret::generate()?)))
        } else {
            Ok(self.blocks.clone())
        }
    }

    fn child_blocks(&self, link: &Link) -> Result<Blocks, FsError> {
        if !self.blocks.is_private() {
            return Ok(self.blocks.clone());
        }
        match &link.key {
            Some(key) => Ok(self.blocks.with_key(Some(key.clone()))),
            None => Err(FsError::MissingHeaderValue(format!("key for {}", link.name))),
        }
    }
}

#[async_trait]
impl Persist for Tree {
    async fn put_detailed(&self) -> Result<PutDetails, FsError> {
        protocol::put_tree(
            &self.blocks,
            &self.links,
            &self.header.skeleton,
            &self.header.children,
            &self.header.metadata,
        )
        .await
    }

    fn metadata(&self) -> &Metadata {
        &self.header.metadata
    }

    fn kind(&self) -> NodeKind {
        NodeKind::new(false, self.blocks.is_private())
    }
}

fn invalid(path: &Path, kind: InvalidPathKind) -> FsError {
    FsError::invalid_path(path.display().to_string(), kind)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::MemoryBlockStore;

    fn public_root() -> Tree {
        Tree::empty(Blocks::public(Arc::new(MemoryBlockStore::new())), SemVer::V1)
    }

    fn private_root() -> Tree {
        let key = Secret::generate().unwrap();
        Tree::empty(
            Blocks::private(Arc::new(MemoryBlockStore::new()), key),
            SemVer::V1,
        )
    }

    fn assert_consistent(tree: &Tree) {
        let links: Vec<_> = tree.links().keys().collect();
        let skeleton: Vec<_> = tree.skeleton().keys().collect();
        let children: Vec<_> = tree.children().keys().collect();
        assert_eq!(links, skeleton);
        assert_eq!(links, children);
    }

    #[tokio::test]
    async fn test_update_direct_child_keeps_header_in_step() {
        let root = public_root();
        let file = root
            .create_child_file("a.txt", Bytes::from_static(b"a"))
            .unwrap();
        let root = root.update_direct_child(Node::File(file), "a.txt").await.unwrap();
        let dir = root.empty_child_tree("dir").unwrap();
        let root = root.update_direct_child(Node::Tree(dir), "dir").await.unwrap();

        assert_consistent(&root);
        let link = root.find_link("a.txt").unwrap();
        assert!(link.is_file);
        assert_eq!(link.key, None);
        assert_eq!(root.skeleton()["a.txt"].cid, link.cid);
        assert_eq!(root.children()["dir"].name, "dir");
        assert!(!root.children()["dir"].is_file);

        let root = root.remove_direct_child("a.txt");
        assert_consistent(&root);
        assert!(root.find_link("a.txt").is_none());
    }

    #[tokio::test]
    async fn test_child_is_renamed_to_link_name() {
        let root = public_root();
        let file = root
            .create_child_file("original", Bytes::from_static(b"x"))
            .unwrap();
        let root = root.update_direct_child(Node::File(file), "renamed").await.unwrap();
        assert_eq!(root.children()["renamed"].name, "renamed");

        let loaded = root.get_direct_child("renamed").await.unwrap().unwrap();
        assert_eq!(loaded.metadata().name, "renamed");
    }

    #[tokio::test]
    async fn test_private_children_have_their_own_keys() {
        let root = private_root().add("/a/b.txt", b"secret".to_vec()).await.unwrap();
        let a = root.find_link("a").unwrap();
        let a_key = a.key.clone().unwrap();
        assert_ne!(Some(&a_key), root.blocks().key());

        let a_tree = root.get("/a").await.unwrap().unwrap().into_tree().unwrap();
        let b_key = a_tree.find_link("b.txt").unwrap().key.clone().unwrap();
        assert_ne!(a_key, b_key);
        assert_eq!(root.cat("/a/b.txt").await.unwrap().as_ref(), b"secret");
        assert_eq!(a_tree.kind(), NodeKind::PrivateTree);
    }

    #[tokio::test]
    async fn test_variants_do_not_mix() {
        let public = public_root();
        let private = private_root();
        let result = public.add_child("/p", private.clone()).await;
        assert!(matches!(result, Err(FsError::VariantMismatch)));
        let result = private.add_child("/p", public).await;
        assert!(matches!(result, Err(FsError::VariantMismatch)));
    }

    #[tokio::test]
    async fn test_overwrite_keeps_ctime() {
        let root = public_root().add("/f", b"one".to_vec()).await.unwrap();
        let before = root.children()["f"].clone();
        let root = root.add("/f", b"two".to_vec()).await.unwrap();
        let after = root.children()["f"].clone();
        assert_eq!(before.ctime, after.ctime);
        assert_eq!(root.cat("/f").await.unwrap().as_ref(), b"two");
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let root = public_root().add("/x/y", b"z".to_vec()).await.unwrap();
        let first = root.put().await.unwrap();
        let second = root.put().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_old_value_is_untouched() {
        let root = public_root().add("/keep", b"1".to_vec()).await.unwrap();
        let changed = root.rm("/keep").await.unwrap();
        assert!(root.exists("/keep").await);
        assert!(!changed.exists("/keep").await);
    }

    #[tokio::test]
    async fn test_size_is_cleared_by_changes() {
        let root = public_root();
        assert_eq!(root.header().size, 0);

        let root = root.add("/a", b"a".to_vec()).await.unwrap();
        let cid = root.put().await.unwrap();
        let loaded = Tree::from_cid(root.blocks().clone(), &cid).await.unwrap();
        let size = root.blocks().size(&cid).await.unwrap();
        assert!(size > 0);
        assert_eq!(loaded.header().size, size);

        let added = loaded.add("/b", b"b".to_vec()).await.unwrap();
        assert_eq!(added.header().size, 0);
        let removed = loaded.rm("/a").await.unwrap();
        assert_eq!(removed.header().size, 0);
        assert_eq!(loaded.header().size, size);
    }
}
