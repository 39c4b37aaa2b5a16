use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::secret::{Secret, SecretError};

#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("keystore error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),
}

/// Key storage collaborator.
///  Resolves a symmetric key by name to exportable key material;
///  creation, rotation and deletion are up to the implementation.
#[async_trait]
pub trait KeyStore: Send + Sync + std::fmt::Debug {
    /// Export the symmetric key stored under `name`
    async fn export_symm_key(&self, name: &str) -> Result<Secret, KeyStoreError>;
}

/// In-memory keystore which mints a fresh key the first time
///  a name is asked for, and hands back the same key after that
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    keys: Arc<Mutex<HashMap<String, Secret>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an externally provided key under `name`, replacing
    ///  whatever was there
    pub fn import_symm_key(&self, name: impl Into<String>, key: Secret) -> Option<Secret> {
        self.keys.lock().insert(name.into(), key)
    }

    pub fn delete_key(&self, name: &str) -> Option<Secret> {
        self.keys.lock().remove(name)
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn export_symm_key(&self, name: &str) -> Result<Secret, KeyStoreError> {
        let mut keys = self.keys.lock();
        if let Some(key) = keys.get(name) {
            return Ok(key.clone());
        }
        tracing::debug!("minting symmetric key for {}", name);
        let key = Secret::generate()?;
        keys.insert(name.to_string(), key.clone());
        Ok(key)
    }
}
