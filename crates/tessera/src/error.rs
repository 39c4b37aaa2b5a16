use std::fmt;

use crate::linked_data::{Cid, CodecError};
use crate::store::BlockStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPathKind {
    /// Nothing exists at the path
    NotFound,
    /// A directory was required but the path names a file
    NotADirectory,
    /// A file was required but the path names a directory
    NotAFile,
    /// The path names an entry that must not exist yet
    AlreadyExists,
    /// The operation needs at least one path component
    Root,
    /// The path contains a component we refuse to interpret, e.g. `..`
    Unsupported,
}

impl fmt::Display for InvalidPathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvalidPathKind::NotFound => "not found",
            InvalidPathKind::NotADirectory => "not a directory",
            InvalidPathKind::NotAFile => "not a file",
            InvalidPathKind::AlreadyExists => "already exists",
            InvalidPathKind::Root => "operation not allowed on the root",
            InvalidPathKind::Unsupported => "unsupported path component",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("block store error: {0}")]
    BlockStore(#[from] BlockStoreError),
    #[error("could not find header value: {0}")]
    MissingHeaderValue(String),
    #[error("improperly formatted header value: {0}")]
    MalformedHeaderValue(String),
    #[error("invalid path {path}: {kind}")]
    InvalidPath { path: String, kind: InvalidPathKind },
    #[error("could not decrypt block {0}")]
    DecryptionFailure(Cid),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("block {cid} does not hold a {expected}")]
    WrongNodeKind { cid: Cid, expected: &'static str },
    #[error("public and private nodes cannot be linked together")]
    VariantMismatch,
    #[error("secret error: {0}")]
    Secret(#[from] crate::crypto::SecretError),
}

impl FsError {
    pub fn invalid_path(path: impl Into<String>, kind: InvalidPathKind) -> Self {
        FsError::InvalidPath {
            path: path.into(),
            kind,
        }
    }

    /// The path kind, if this is an [`FsError::InvalidPath`]
    pub fn path_kind(&self) -> Option<InvalidPathKind> {
        match self {
            FsError::InvalidPath { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
