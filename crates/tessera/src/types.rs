use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::linked_data::{BlockEncoded, Cid, DagCborCodec};

/// Encoding format version a node was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemVer {
    pub const V1: SemVer = SemVer::new(1, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub const fn latest() -> Self {
        Self::V1
    }
}

impl Default for SemVer {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Milliseconds since the Unix epoch
pub fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub is_file: bool,
    pub mtime: i64,
    pub ctime: i64,
    pub version: SemVer,
}

impl BlockEncoded<DagCborCodec> for Metadata {}

impl Metadata {
    pub fn empty(is_file: bool, version: SemVer) -> Self {
        let ts = now();
        Self {
            name: String::new(),
            is_file,
            mtime: ts,
            ctime: ts,
            version,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Same metadata, modified now
    pub fn touched(&self) -> Self {
        Self {
            mtime: now(),
            ..self.clone()
        }
    }
}

/// Recursive shadow of a directory: for every descendant, the CIDs of
///  its root, userland and metadata blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonInfo {
    pub cid: Cid,
    pub userland: Cid,
    pub metadata: Cid,
    pub children: Skeleton,
}

pub type Skeleton = BTreeMap<String, SkeletonInfo>;

impl BlockEncoded<DagCborCodec> for Skeleton {}

/// Metadata of a directory's immediate entries
pub type Children = BTreeMap<String, Metadata>;

impl BlockEncoded<DagCborCodec> for Children {}

/// Decoded, in-memory view of everything a node's header blocks hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub metadata: Metadata,
    /// Byte size of the root block this tree was loaded from.
    ///  0 for a new tree and after any change
    pub size: u64,
    pub skeleton: Skeleton,
    pub children: Children,
}

impl Header {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            size: 0,
            skeleton: Skeleton::new(),
            children: Children::new(),
        }
    }
}

/// Result of writing a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutDetails {
    pub cid: Cid,
    pub userland: Cid,
    pub metadata: Cid,
    /// Byte size of the root block
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeInfo {
    pub userland: Cid,
    pub metadata: Metadata,
    pub skeleton: Skeleton,
    pub children: Children,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub userland: Cid,
    pub metadata: Metadata,
}

/// What a root CID decodes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeInfo {
    Tree(TreeInfo),
    File(FileInfo),
}

impl NodeInfo {
    pub fn metadata(&self) -> &Metadata {
        match self {
            NodeInfo::Tree(info) => &info.metadata,
            NodeInfo::File(info) => &info.metadata,
        }
    }

    pub fn userland(&self) -> &Cid {
        match self {
            NodeInfo::Tree(info) => &info.userland,
            NodeInfo::File(info) => &info.userland,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    PublicTree,
    PublicFile,
    PrivateTree,
    PrivateFile,
}

impl NodeKind {
    pub fn new(is_file: bool, is_private: bool) -> Self {
        match (is_file, is_private) {
            (false, false) => NodeKind::PublicTree,
            (true, false) => NodeKind::PublicFile,
            (false, true) => NodeKind::PrivateTree,
            (true, true) => NodeKind::PrivateFile,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::PublicFile | NodeKind::PrivateFile)
    }

    pub fn is_private(&self) -> bool {
        matches!(self, NodeKind::PrivateTree | NodeKind::PrivateFile)
    }
}

/// Shape checks applied to decoded header values
pub mod check {
    use super::{Children, Metadata, Skeleton};

    fn is_name(name: &str) -> bool {
        !name.contains('/')
    }

    pub fn is_metadata(metadata: &Metadata) -> bool {
        is_name(&metadata.name)
    }

    pub fn is_skeleton(skeleton: &Skeleton) -> bool {
        skeleton
            .iter()
            .all(|(name, info)| !name.is_empty() && is_name(name) && is_skeleton(&info.children))
    }

    pub fn is_children(children: &Children) -> bool {
        children
            .iter()
            .all(|(name, metadata)| &metadata.name == name && is_metadata(metadata))
    }
}
