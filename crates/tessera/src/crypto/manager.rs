use std::sync::Arc;

use super::keystore::{KeyStore, KeyStoreError};
use super::secret::{Secret, SecretError};

/// Obtains named keys from a [`KeyStore`] and applies keys to raw
///  block payloads
#[derive(Debug, Clone)]
pub struct KeyManager {
    store: Arc<dyn KeyStore>,
}

impl KeyManager {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Key material for a named symmetric key
    pub async fn key_by_name(&self, name: &str) -> Result<Secret, KeyStoreError> {
        self.store.export_symm_key(name).await
    }

    /// Exported (hex) key material for a named symmetric key
    pub async fn key_str_by_name(&self, name: &str) -> Result<String, KeyStoreError> {
        Ok(self.key_by_name(name).await?.to_hex())
    }

    /// A fresh key that no keystore knows about
    pub fn gen_key() -> Result<Secret, SecretError> {
        Secret::generate()
    }

    pub fn gen_key_str() -> Result<String, SecretError> {
        Ok(Self::gen_key()?.to_hex())
    }

    pub fn encrypt(data: &[u8], key: &Secret) -> Result<Vec<u8>, SecretError> {
        key.encrypt(data)
    }

    pub fn decrypt(encrypted: &[u8], key: &Secret) -> Result<Vec<u8>, SecretError> {
        key.decrypt(encrypted)
    }

    /// Encrypt under key material in its exported string form
    pub fn encrypt_with_str(data: &[u8], key_str: &str) -> Result<Vec<u8>, SecretError> {
        Secret::from_hex(key_str)?.encrypt(data)
    }

    pub fn decrypt_with_str(encrypted: &[u8], key_str: &str) -> Result<Vec<u8>, SecretError> {
        Secret::from_hex(key_str)?.decrypt(encrypted)
    }
}
