use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::Persist;
use crate::blocks::Blocks;
use crate::crypto::Secret;
use crate::error::FsError;
use crate::linked_data::Cid;
use crate::protocol;
use crate::store::BlockStore;
use crate::types::{FileInfo, Metadata, NodeInfo, NodeKind, PutDetails, SemVer};

/// A leaf: byte content plus metadata
#[derive(Debug, Clone)]
pub struct File {
    blocks: Blocks,
    content: Bytes,
    metadata: Metadata,
}

impl File {
    pub fn new(blocks: Blocks, content: Bytes, metadata: Metadata) -> Self {
        Self {
            blocks,
            content,
            metadata,
        }
    }

    /// A fresh file, not yet written anywhere
    pub fn create(blocks: Blocks, content: impl Into<Bytes>, version: SemVer) -> Self {
        Self::new(blocks, content.into(), Metadata::empty(true, version))
    }

    pub async fn from_cid(blocks: Blocks, cid: &Cid) -> Result<Self, FsError> {
        match protocol::get(&blocks, cid).await? {
            NodeInfo::File(info) => Self::from_info(blocks, info).await,
            NodeInfo::Tree(_) => Err(FsError::WrongNodeKind {
                cid: *cid,
                expected: "file",
            }),
        }
    }

    /// Load a private file given its key in exported form
    pub async fn from_cid_with_key(
        store: Arc<dyn BlockStore>,
        cid: &Cid,
        key: &str,
    ) -> Result<Self, FsError> {
        let blocks = Blocks::private(store, Secret::from_hex(key)?);
        Self::from_cid(blocks, cid).await
    }

    pub async fn from_info(blocks: Blocks, info: FileInfo) -> Result<Self, FsError> {
        let content = blocks.get_raw(&info.userland).await?;
        Ok(Self::new(blocks, content, info.metadata))
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Same file with new content; keeps creation time and key
    pub fn update_content(&self, content: impl Into<Bytes>) -> Self {
        Self {
            blocks: self.blocks.clone(),
            content: content.into(),
            metadata: self.metadata.touched(),
        }
    }

    pub(crate) fn named(self, name: &str) -> Self {
        if self.metadata.name == name {
            return self;
        }
        Self {
            metadata: self.metadata.with_name(name),
            ..self
        }
    }
}

#[async_trait]
impl Persist for File {
    async fn put_detailed(&self) -> Result<PutDetails, FsError> {
        protocol::put_file(&self.blocks, &self.content, &self.metadata).await
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn kind(&self) -> NodeKind {
        NodeKind::new(true, self.blocks.is_private())
    }
}
