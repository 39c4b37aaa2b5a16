/**
 * Thin wrapper around IPLD.
 * CIDs, codecs and the BLAKE3 bridge between
 *  CIDs and block store hashes.
 */
pub mod linked_data;
/**
 * Content-addressed block storage.
 *  In-memory, or backed by iroh-blobs.
 */
pub mod store;
/**
 * Symmetric keys, key storage and
 *  block encryption.
 */
pub mod crypto;
pub mod link;
pub mod types;
pub mod error;
pub mod path;
/**
 * Block store handle which encrypts and decrypts
 *  on the way through when given a key.
 */
pub mod blocks;
/**
 * How trees and files are laid out as
 *  linked blocks, and how they are read back.
 */
pub mod protocol;
/**
 * Trees and files, and the path operations
 *  built on top of them.
 */
pub mod node;
/**
 * Bounded local history of published roots.
 */
pub mod cid_log;
pub mod config;
/**
 * A file system root bundled with its
 *  history log and collaborators.
 */
pub mod fs;

pub mod prelude {
    pub use crate::blocks::Blocks;
    pub use crate::cid_log::{CidLog, FileLogStore, LogStore, MemoryLogStore, RootComparison};
    pub use crate::config::FsConfig;
    pub use crate::crypto::{KeyManager, KeyStore, MemoryKeyStore, Secret};
    pub use crate::error::{FsError, InvalidPathKind};
    pub use crate::fs::{FileSystem, FileSystemError, Stores};
    pub use crate::link::{Link, Links};
    pub use crate::linked_data::Cid;
    pub use crate::node::{Child, File, Node, Persist, Tree};
    pub use crate::store::{BlobsStore, BlockStore, MemoryBlockStore};
    pub use crate::types::{Metadata, NodeKind, PutDetails, SemVer};
}
