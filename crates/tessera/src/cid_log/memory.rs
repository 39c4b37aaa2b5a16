use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use super::store::{KeyLocks, LogStore, LogStoreError};

/// In-memory log store
#[derive(Debug, Clone, Default)]
pub struct MemoryLogStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    locks: KeyLocks,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, LogStoreError> {
        Ok(self.inner.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), LogStoreError> {
        self.inner.write().insert(key.to_string(), value);
        Ok(())
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.get(key)
    }
}
