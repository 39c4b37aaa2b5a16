//! Root history log
//!
//! A bounded, most-recent-first record of the root CIDs this instance
//!  has published, kept in a local [`LogStore`] under a single key as a
//!  JSON array of CID strings. It is what lets a caller tell whether a
//!  root seen elsewhere is one it already knows about.

use std::sync::Arc;

use crate::linked_data::Cid;

mod file;
mod memory;
mod store;

pub use file::FileLogStore;
pub use memory::MemoryLogStore;
pub use store::{KeyLocks, LogStore, LogStoreError};

pub const DEFAULT_LOG_KEY: &str = "tessera.fs_cid_log";
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum CidLogError {
    #[error("log store error: {0}")]
    Store(#[from] LogStoreError),
    #[error("log entry is not a list of cids: {0}")]
    Format(#[from] serde_json::Error),
}

/// Where a root observed elsewhere sits relative to local history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootComparison {
    /// It is our newest root
    Equal,
    /// We have published it, and newer roots since
    LocalAhead,
    /// Not in our history: the remote is ahead of us or has diverged
    Unknown,
}

#[derive(Debug, Clone)]
pub struct CidLog {
    store: Arc<dyn LogStore>,
    key: String,
    capacity: usize,
}

impl CidLog {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self::with_options(store, DEFAULT_LOG_KEY, DEFAULT_LOG_CAPACITY)
    }

    pub fn with_options(store: Arc<dyn LogStore>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            store,
            key: key.into(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Every recorded root, most recent first
    pub async fn get(&self) -> Result<Vec<Cid>, CidLogError> {
        let Some(raw) = self.store.get_item(&self.key).await? else {
            return Ok(Vec::new());
        };
        let entries: Vec<String> = serde_json::from_str(&raw)?;
        let cids = entries
            .into_iter()
            .filter_map(|entry| match entry.parse::<Cid>() {
                Ok(cid) => Some(cid),
                Err(err) => {
                    tracing::warn!("dropping unparsable log entry {:?}: {}", entry, err);
                    None
                }
            })
            .collect();
        Ok(cids)
    }

    /// Record `cid` as the newest root, dropping the oldest
    ///  entries beyond capacity
    pub async fn add(&self, cid: Cid) -> Result<(), CidLogError> {
        // held across the read and the write, shared by every
        //  handle on this store
        let lock = self.store.lock_for(&self.key);
        let _guard = lock.lock().await;
        let mut cids = self.get().await?;
        cids.insert(0, cid);
        cids.truncate(self.capacity);

        let entries: Vec<String> = cids.iter().map(Cid::to_string).collect();
        self.store
            .set_item(&self.key, serde_json::to_string(&entries)?)
            .await?;
        tracing::info!("recorded root {} ({} in history)", cid, cids.len());
        Ok(())
    }

    /// Position of `cid` in the log (`None` if absent) along
    ///  with the current log length
    pub async fn index(&self, cid: &Cid) -> Result<(Option<usize>, usize), CidLogError> {
        let cids = self.get().await?;
        let position = cids.iter().position(|c| c == cid);
        Ok((position, cids.len()))
    }

    pub async fn newest(&self) -> Result<Option<Cid>, CidLogError> {
        Ok(self.get().await?.into_iter().next())
    }

    pub async fn compare(&self, remote: &Cid) -> Result<RootComparison, CidLogError> {
        Ok(match self.index(remote).await?.0 {
            Some(0) => RootComparison::Equal,
            Some(_) => RootComparison::LocalAhead,
            None => RootComparison::Unknown,
        })
    }
}
