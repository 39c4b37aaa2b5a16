use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::crypto::{Secret, SecretError};
use crate::error::FsError;
use crate::linked_data::{BlockEncoded, Cid, CodecError, DagCborCodec, LD_CBOR_CODEC, LD_RAW_CODEC};
use crate::store::BlockStore;

/// A block store handle scoped to one node.
///
/// Public handles pass bytes straight through. Private handles encrypt
///  every block on the way in and decrypt it on the way out, so the
///  encoding protocol never has to know which variant it is writing.
#[derive(Debug, Clone)]
pub struct Blocks {
    store: Arc<dyn BlockStore>,
    key: Option<Secret>,
}

impl Blocks {
    pub fn public(store: Arc<dyn BlockStore>) -> Self {
        Self { store, key: None }
    }

    pub fn private(store: Arc<dyn BlockStore>, key: Secret) -> Self {
        Self {
            store,
            key: Some(key),
        }
    }

    /// Same store, different key
    pub fn with_key(&self, key: Option<Secret>) -> Self {
        Self {
            store: self.store.clone(),
            key,
        }
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    pub fn key(&self) -> Option<&Secret> {
        self.key.as_ref()
    }

    pub fn is_private(&self) -> bool {
        self.key.is_some()
    }

    async fn put_block(&self, codec: u64, data: Vec<u8>) -> Result<(Cid, u64), FsError> {
        let (codec, data) = match &self.key {
            // NOTE: encrypted blocks are opaque bytes, whatever
            //  they hold once decrypted
            Some(key) => (LD_RAW_CODEC, key.encrypt(&data)?),
            None => (codec, data),
        };
        let (cid, size) = self.store.put(codec, data).await?;
        tracing::debug!("put block {} ({} bytes)", cid, size);
        Ok((cid, size))
    }

    /// Write raw bytes as a single block
    pub async fn put_raw(&self, data: Vec<u8>) -> Result<(Cid, u64), FsError> {
        self.put_block(LD_RAW_CODEC, data).await
    }

    /// Write a DAG-CBOR encoded value as a single block
    pub async fn put_encoded<T: BlockEncoded<DagCborCodec>>(
        &self,
        value: &T,
    ) -> Result<(Cid, u64), FsError> {
        self.put_block(LD_CBOR_CODEC, value.encode()?).await
    }

    /// Fetch the plaintext bytes of a block
    pub async fn get_raw(&self, cid: &Cid) -> Result<Bytes, FsError> {
        let data = self.store.get(cid).await?;
        tracing::debug!("got block {} ({} bytes)", cid, data.len());
        match &self.key {
            Some(key) => match key.decrypt(&data) {
                Ok(plaintext) => Ok(Bytes::from(plaintext)),
                Err(SecretError::Decrypt) => {
                    tracing::debug!("failed to decrypt block {}", cid);
                    Err(FsError::DecryptionFailure(*cid))
                }
                Err(err) => Err(err.into()),
            },
            None => Ok(data),
        }
    }

    /// Fetch and DAG-CBOR decode a block
    pub async fn get_decoded<T: DeserializeOwned>(&self, cid: &Cid) -> Result<T, FsError> {
        let data = self.get_raw(cid).await?;
        serde_ipld_dagcbor::from_slice(&data)
            .map_err(|e| FsError::Codec(CodecError::Decode(e.to_string())))
    }

    /// Store-reported byte size of a block
    pub async fn size(&self, cid: &Cid) -> Result<u64, FsError> {
        Ok(self.store.size(cid).await?)
    }
}
