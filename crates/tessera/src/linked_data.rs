//! Thin wrapper around IPLD.
//!
//! Blocks are addressed by CIDv1 over a BLAKE3 multihash, which is the
//!  same digest iroh-blobs uses natively, so a [`Cid`] can be turned back
//!  into a store hash without a lookup table.

use serde::{de::DeserializeOwned, Serialize};

pub use cid::Cid;
pub use iroh_blobs::Hash;

use multihash::Multihash;

/// Multicodec code for raw bytes
pub const LD_RAW_CODEC: u64 = 0x55;
/// Multicodec code for DAG-CBOR
pub const LD_CBOR_CODEC: u64 = 0x71;
/// Multihash code for BLAKE3
pub const BLAKE3_HASH_CODE: u64 = 0x1e;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("dag-cbor encode error: {0}")]
    Encode(String),
    #[error("dag-cbor decode error: {0}")]
    Decode(String),
    #[error("unsupported multihash code: {0:#x}")]
    UnsupportedHash(u64),
    #[error("multihash error: {0}")]
    Multihash(#[from] multihash::Error),
}

/// Marker for a block codec
pub trait Codec {
    const CODE: u64;
}

#[derive(Debug, Clone, Copy)]
pub struct DagCborCodec;

impl Codec for DagCborCodec {
    const CODE: u64 = LD_CBOR_CODEC;
}

/// Anything that can be written to, and read back from, a single block
pub trait BlockEncoded<C: Codec>: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serde_ipld_dagcbor::to_vec(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        serde_ipld_dagcbor::from_slice(data).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn codec(&self) -> u64 {
        C::CODE
    }
}

/// Build a CIDv1 for a block stored under `hash`
pub fn cid_from_hash(codec: u64, hash: &Hash) -> Result<Cid, CodecError> {
    let mh = Multihash::<64>::wrap(BLAKE3_HASH_CODE, hash.as_bytes())?;
    Ok(Cid::new_v1(codec, mh))
}

/// Recover the store hash addressed by a CID
pub fn hash_from_cid(cid: &Cid) -> Result<Hash, CodecError> {
    let mh = cid.hash();
    if mh.code() != BLAKE3_HASH_CODE {
        return Err(CodecError::UnsupportedHash(mh.code()));
    }
    let digest: [u8; 32] = mh
        .digest()
        .try_into()
        .map_err(|_| CodecError::UnsupportedHash(mh.code()))?;
    Ok(Hash::from_bytes(digest))
}

/// Content address for `data` under `codec`, without touching a store
pub fn cid_for(codec: u64, data: &[u8]) -> Result<Cid, CodecError> {
    let hash = Hash::from_bytes(*blake3::hash(data).as_bytes());
    cid_from_hash(codec, &hash)
}
