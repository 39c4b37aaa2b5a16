//! Caller-level handle over a file system root
//!
//! [`FileSystem`] owns the current root [`Tree`] and the root history log.
//!  Path operations replace the owned root; nothing is written to the
//!  block store until [`FileSystem::publish`] is called.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::blocks::Blocks;
use crate::cid_log::{CidLog, CidLogError, LogStore, MemoryLogStore, RootComparison};
use crate::config::FsConfig;
use crate::crypto::{KeyManager, KeyStoreError, MemoryKeyStore};
use crate::error::FsError;
use crate::link::Links;
use crate::linked_data::Cid;
use crate::node::{Child, Node, Persist, Tree};
use crate::store::{BlockStore, MemoryBlockStore};

#[derive(Debug, thiserror::Error)]
pub enum FileSystemError {
    #[error("fs error: {0}")]
    Fs(#[from] FsError),
    #[error("cid log error: {0}")]
    Log(#[from] CidLogError),
    #[error("keystore error: {0}")]
    KeyStore(#[from] KeyStoreError),
}

/// Handles to the collaborators a file system works against
#[derive(Debug, Clone)]
pub struct Stores {
    pub blocks: Arc<dyn BlockStore>,
    pub log: Arc<dyn LogStore>,
    pub keys: KeyManager,
}

impl Stores {
    pub fn new(blocks: Arc<dyn BlockStore>, log: Arc<dyn LogStore>, keys: KeyManager) -> Self {
        Self { blocks, log, keys }
    }

    /// Everything in memory
    pub fn memory() -> Self {
        Self {
            blocks: Arc::new(MemoryBlockStore::new()),
            log: Arc::new(MemoryLogStore::new()),
            keys: KeyManager::new(Arc::new(MemoryKeyStore::new())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSystem {
    // path operations on a shared handle take turns
    root: Arc<Mutex<Tree>>,
    log: CidLog,
    config: FsConfig,
}

impl FileSystem {
    /// A new file system with an empty root
    pub async fn empty(stores: &Stores, config: FsConfig) -> Result<Self, FileSystemError> {
        let blocks = Self::root_blocks(stores, &config).await?;
        let root = Tree::empty(blocks, config.version);
        Ok(Self::with_root(stores, config, root))
    }

    /// Open the file system rooted at `cid`
    pub async fn from_cid(
        stores: &Stores,
        config: FsConfig,
        cid: &Cid,
    ) -> Result<Self, FileSystemError> {
        let blocks = Self::root_blocks(stores, &config).await?;
        let root = Tree::from_cid(blocks, cid).await?;
        tracing::info!("opened file system at {}", cid);
        Ok(Self::with_root(stores, config, root))
    }

    /// Open the most recently published root, if there is one
    pub async fn load_newest(
        stores: &Stores,
        config: FsConfig,
    ) -> Result<Option<Self>, FileSystemError> {
        let log = Self::log_for(stores, &config);
        match log.newest().await? {
            Some(cid) => Ok(Some(Self::from_cid(stores, config, &cid).await?)),
            None => Ok(None),
        }
    }

    fn with_root(stores: &Stores, config: FsConfig, root: Tree) -> Self {
        Self {
            root: Arc::new(Mutex::new(root)),
            log: Self::log_for(stores, &config),
            config,
        }
    }

    fn log_for(stores: &Stores, config: &FsConfig) -> CidLog {
        CidLog::with_options(stores.log.clone(), &config.log_key, config.log_capacity)
    }

    async fn root_blocks(stores: &Stores, config: &FsConfig) -> Result<Blocks, FileSystemError> {
        match &config.key_name {
            Some(name) => {
                let key = stores.keys.key_by_name(name).await?;
                Ok(Blocks::private(stores.blocks.clone(), key))
            }
            None => Ok(Blocks::public(stores.blocks.clone())),
        }
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn log(&self) -> &CidLog {
        &self.log
    }

    /// Snapshot of the current root
    pub async fn root(&self) -> Tree {
        self.root.lock().await.clone()
    }

    /// Exported root key, for handing a private root to someone else
    ///  alongside its CID
    pub async fn root_key_str(&self) -> Option<String> {
        self.root.lock().await.blocks().key().map(|key| key.to_hex())
    }

    pub async fn ls(&self, path: impl AsRef<Path>) -> Result<Links, FileSystemError> {
        Ok(self.root.lock().await.ls(path).await?)
    }

    pub async fn cat(&self, path: impl AsRef<Path>) -> Result<Bytes, FileSystemError> {
        Ok(self.root.lock().await.cat(path).await?)
    }

    pub async fn get(&self, path: impl AsRef<Path>) -> Result<Option<Node>, FileSystemError> {
        Ok(self.root.lock().await.get(path).await?)
    }

    pub async fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.root.lock().await.exists(path).await
    }

    pub async fn mkdir(&self, path: impl AsRef<Path>) -> Result<(), FileSystemError> {
        let mut root = self.root.lock().await;
        *root = root.mkdir(path).await?;
        Ok(())
    }

    pub async fn add(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Bytes>,
    ) -> Result<(), FileSystemError> {
        let mut root = self.root.lock().await;
        *root = root.add(path, content).await?;
        Ok(())
    }

    pub async fn add_child(
        &self,
        path: impl AsRef<Path>,
        child: impl Into<Child>,
    ) -> Result<(), FileSystemError> {
        let mut root = self.root.lock().await;
        *root = root.add_child(path, child).await?;
        Ok(())
    }

    pub async fn rm(&self, path: impl AsRef<Path>) -> Result<(), FileSystemError> {
        let mut root = self.root.lock().await;
        *root = root.rm(path).await?;
        Ok(())
    }

    /// Write the current root and record it as the newest in
    ///  the history log
    pub async fn publish(&self) -> Result<Cid, FileSystemError> {
        let cid = self.root.lock().await.put().await?;
        self.log.add(cid).await?;
        tracing::info!("published root {}", cid);
        Ok(cid)
    }

    /// Classify a root observed elsewhere against local history
    pub async fn compare(&self, remote: &Cid) -> Result<RootComparison, FileSystemError> {
        Ok(self.log.compare(remote).await?)
    }
}
