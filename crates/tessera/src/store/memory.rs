use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{BlockStore, BlockStoreError};
use crate::linked_data::{cid_for, hash_from_cid, Cid};

/// In-memory block store keyed by CID
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    inner: Arc<RwLock<HashMap<Cid, Bytes>>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blocks held
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drop a block, as if it had never been fetched locally
    pub fn evict(&self, cid: &Cid) -> bool {
        self.inner.write().remove(cid).is_some()
    }

    /// Overwrite the bytes held under a CID without re-addressing them.
    ///  Only useful for exercising integrity checks
    pub fn tamper(&self, cid: &Cid, data: Vec<u8>) {
        self.inner.write().insert(*cid, Bytes::from(data));
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put(&self, codec: u64, data: Vec<u8>) -> Result<(Cid, u64), BlockStoreError> {
        let cid = cid_for(codec, &data)?;
        let size = data.len() as u64;
        self.inner
            .write()
            .entry(cid)
            .or_insert_with(|| Bytes::from(data));
        Ok((cid, size))
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        let data = self
            .inner
            .read()
            .get(cid)
            .cloned()
            .ok_or(BlockStoreError::MissingBlock(*cid))?;

        let expected = hash_from_cid(cid)?;
        if blake3::hash(&data).as_bytes() != expected.as_bytes() {
            return Err(BlockStoreError::Corrupt(*cid));
        }
        Ok(data)
    }

    async fn size(&self, cid: &Cid) -> Result<u64, BlockStoreError> {
        self.inner
            .read()
            .get(cid)
            .map(|data| data.len() as u64)
            .ok_or(BlockStoreError::MissingBlock(*cid))
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        Ok(self.inner.read().contains_key(cid))
    }
}
