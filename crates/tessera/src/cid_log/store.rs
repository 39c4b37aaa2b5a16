use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum LogStoreError {
    #[error("log store error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid log key: {0}")]
    InvalidKey(String),
}

/// Local key-value storage backing the root history log
#[async_trait]
pub trait LogStore: Send + Sync + Debug {
    /// Value stored under `key`, or `None` if nothing has been
    ///  written there yet
    async fn get_item(&self, key: &str) -> Result<Option<String>, LogStoreError>;

    async fn set_item(&self, key: &str, value: String) -> Result<(), LogStoreError>;

    /// Mutex guarding read-modify-write of `key`. Every caller
    ///  asking for the same item of the same store gets the same lock
    fn lock_for(&self, key: &str) -> Arc<Mutex<()>>;
}

/// One async mutex per key, created on first use
#[derive(Debug, Clone, Default)]
pub struct KeyLocks(Arc<parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>>);

impl KeyLocks {
    pub fn get(&self, key: &str) -> Arc<Mutex<()>> {
        self.0
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
