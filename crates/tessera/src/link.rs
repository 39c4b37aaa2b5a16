//! Link registry
//!
//! A [`Link`] is a named edge from a container block to a child block.
//!  Names are unique within a [`Links`] map, which is ordered so that
//!  encoding it is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::Secret;
use crate::linked_data::{BlockEncoded, Cid, DagCborCodec};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub name: String,
    pub cid: Cid,
    /// Byte size of the block `cid` addresses
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
    pub is_file: bool,
    // Only ever set on links inside a private tree, whose link
    //  block is itself encrypted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Secret>,
}

pub type Links = BTreeMap<String, Link>;

impl BlockEncoded<DagCborCodec> for Links {}

/// Construct a link
pub fn make(name: impl Into<String>, cid: Cid, is_file: bool, size: u64) -> Link {
    Link {
        name: name.into(),
        cid,
        size,
        mtime: None,
        is_file,
        key: None,
    }
}

impl Link {
    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn with_key(mut self, key: Option<Secret>) -> Self {
        self.key = key;
        self
    }
}
