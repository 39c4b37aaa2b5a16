//! Tree and file nodes
//!
//! Nodes are immutable values. Every path operation on a [`Tree`] returns a
//!  new tree and leaves the one it was called on untouched; the old value
//!  stays valid and can still be written or read from.
//!
//! A tree holds its direct entries as [`Link`](crate::link::Link)s, i.e. by
//!  CID, never as loaded subtrees. Changing one file therefore rewrites only
//!  the directories on the path from that file up to the tree it was
//!  changed through; every sibling keeps its CID.
//!
//! Whether a node is public or private is decided by its
//!  [`Blocks`](crate::blocks::Blocks) handle. A private tree mints a fresh
//!  key for every child it creates and records it in the child's link.

use async_trait::async_trait;

use crate::error::FsError;
use crate::linked_data::Cid;
use crate::types::{Metadata, NodeKind, PutDetails};

mod file;
mod tree;

pub use file::File;
pub use tree::{Child, Tree};

/// What every node can do regardless of variant
#[async_trait]
pub trait Persist: Send + Sync {
    /// Write the node's blocks, returning the root CID along
    ///  with the CIDs of its principal sub-blocks
    async fn put_detailed(&self) -> Result<PutDetails, FsError>;

    async fn put(&self) -> Result<Cid, FsError> {
        Ok(self.put_detailed().await?.cid)
    }

    fn metadata(&self) -> &Metadata;

    fn kind(&self) -> NodeKind;
}

/// Either kind of node, as found at a path
#[derive(Debug, Clone)]
pub enum Node {
    Tree(Tree),
    File(File),
}

impl Node {
    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Node::Tree(tree) => Some(tree),
            Node::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Node::File(file) => Some(file),
            Node::Tree(_) => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            Node::Tree(tree) => Some(tree),
            Node::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<File> {
        match self {
            Node::File(file) => Some(file),
            Node::Tree(_) => None,
        }
    }

    pub(crate) fn named(self, name: &str) -> Node {
        match self {
            Node::Tree(tree) => Node::Tree(tree.named(name)),
            Node::File(file) => Node::File(file.named(name)),
        }
    }
}

impl From<Tree> for Node {
    fn from(tree: Tree) -> Self {
        Node::Tree(tree)
    }
}

impl From<File> for Node {
    fn from(file: File) -> Self {
        Node::File(file)
    }
}

#[async_trait]
impl Persist for Node {
    async fn put_detailed(&self) -> Result<PutDetails, FsError> {
        match self {
            Node::Tree(tree) => tree.put_detailed().await,
            Node::File(file) => file.put_detailed().await,
        }
    }

    fn metadata(&self) -> &Metadata {
        match self {
            Node::Tree(tree) => tree.metadata(),
            Node::File(file) => file.metadata(),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            Node::Tree(tree) => tree.kind(),
            Node::File(file) => file.kind(),
        }
    }
}
