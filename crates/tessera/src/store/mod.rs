//! The DAG store collaborator.
//!
//! Everything above this module only ever sees [`BlockStore`]: content
//!  addressed put / get of raw bytes plus a size query. Implementations
//!  must be idempotent (putting identical bytes yields an identical CID)
//!  and must integrity-check what they hand back.

use async_trait::async_trait;
use bytes::Bytes;

use crate::linked_data::{Cid, CodecError};

mod blobs;
mod memory;

pub use blobs::BlobsStore;
pub use memory::MemoryBlockStore;

#[derive(Debug, thiserror::Error)]
pub enum BlockStoreError {
    #[error("block store error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("block store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing block: {0}")]
    MissingBlock(Cid),
    #[error("block {0} failed its integrity check")]
    Corrupt(Cid),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

#[async_trait]
pub trait BlockStore: Send + Sync + std::fmt::Debug {
    /// Store `data` under the given multicodec, returning its CID and
    ///  the byte size of the stored block
    async fn put(&self, codec: u64, data: Vec<u8>) -> Result<(Cid, u64), BlockStoreError>;

    /// Fetch the bytes of a block.
    ///  Fails with [`BlockStoreError::MissingBlock`] if the block
    ///  is not present
    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError>;

    /// Byte size of a stored block
    async fn size(&self, cid: &Cid) -> Result<u64, BlockStoreError>;

    /// Whether a block is present
    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError>;
}
