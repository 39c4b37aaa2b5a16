use std::future::IntoFuture;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use iroh_blobs::{
    api::blobs::{BlobStatus, Blobs},
    store::{fs::FsStore, mem::MemStore},
    BlobsProtocol, Hash,
};

use super::{BlockStore, BlockStoreError};
use crate::linked_data::{cid_from_hash, hash_from_cid, Cid};

/// Block store over a local iroh-blobs store.
///  Blocks are raw BLAKE3-addressed blobs; the codec only
///  lives in the CID handed back to the caller.
#[derive(Clone, Debug)]
pub struct BlobsStore {
    pub inner: Arc<BlobsProtocol>,
}

impl Deref for BlobsStore {
    type Target = Arc<BlobsProtocol>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl BlobsStore {
    /// Load a blob store persisted at the given path
    pub async fn fs(path: &Path) -> Result<Self, BlockStoreError> {
        tracing::debug!("BlobsStore::fs called with path: {:?}", path);
        let store = FsStore::load(path).await?;
        let blobs = BlobsProtocol::new(&store, None);
        Ok(Self {
            inner: Arc::new(blobs),
        })
    }

    /// Load a memory blobs store
    pub async fn memory() -> Result<Self, BlockStoreError> {
        let store = MemStore::new();
        let blobs = BlobsProtocol::new(&store, None);
        Ok(Self {
            inner: Arc::new(blobs),
        })
    }

    /// Get a handle to the underlying blobs client against
    ///  the store
    pub fn blobs(&self) -> &Blobs {
        self.inner.store().blobs()
    }

    async fn status(&self, hash: Hash) -> Result<BlobStatus, BlockStoreError> {
        self.blobs()
            .status(hash)
            .await
            .map_err(|err| BlockStoreError::Default(anyhow!(err)))
    }
}

#[async_trait]
impl BlockStore for BlobsStore {
    async fn put(&self, codec: u64, data: Vec<u8>) -> Result<(Cid, u64), BlockStoreError> {
        let size = data.len() as u64;
        let hash = self
            .blobs()
            .add_bytes(data)
            .into_future()
            .await
            .map_err(|err| BlockStoreError::Default(anyhow!(err)))?
            .hash;
        Ok((cid_from_hash(codec, &hash)?, size))
    }

    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        let hash = hash_from_cid(cid)?;
        if !matches!(self.status(hash).await?, BlobStatus::Complete { .. }) {
            return Err(BlockStoreError::MissingBlock(*cid));
        }
        // iroh-blobs verifies the bao outboard on read
        let bytes = self
            .blobs()
            .get_bytes(hash)
            .await
            .map_err(|err| BlockStoreError::Default(anyhow!(err)))?;
        Ok(bytes)
    }

    async fn size(&self, cid: &Cid) -> Result<u64, BlockStoreError> {
        let hash = hash_from_cid(cid)?;
        match self.status(hash).await? {
            BlobStatus::Complete { size } => Ok(size),
            _ => Err(BlockStoreError::MissingBlock(*cid)),
        }
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        let hash = hash_from_cid(cid)?;
        Ok(matches!(
            self.status(hash).await?,
            BlobStatus::Complete { .. }
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::linked_data::{LD_CBOR_CODEC, LD_RAW_CODEC};

    #[tokio::test]
    async fn test_put_get_size() {
        let store = BlobsStore::memory().await.unwrap();
        let (cid, size) = store.put(LD_RAW_CODEC, b"blob data".to_vec()).await.unwrap();
        assert_eq!(size, 9);
        assert!(store.has(&cid).await.unwrap());
        assert_eq!(store.size(&cid).await.unwrap(), 9);
        assert_eq!(store.get(&cid).await.unwrap(), Bytes::from_static(b"blob data"));
    }

    #[tokio::test]
    async fn test_codec_only_changes_the_cid() {
        let store = BlobsStore::memory().await.unwrap();
        let (raw, _) = store.put(LD_RAW_CODEC, b"same".to_vec()).await.unwrap();
        let (cbor, _) = store.put(LD_CBOR_CODEC, b"same".to_vec()).await.unwrap();
        assert_ne!(raw, cbor);
        assert_eq!(raw.hash(), cbor.hash());
        assert_eq!(store.get(&cbor).await.unwrap(), store.get(&raw).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_block() {
        let store = BlobsStore::memory().await.unwrap();
        let cid = crate::linked_data::cid_for(LD_RAW_CODEC, b"absent").unwrap();
        assert!(!store.has(&cid).await.unwrap());
        assert!(matches!(
            store.get(&cid).await,
            Err(BlockStoreError::MissingBlock(_))
        ));
    }
}
