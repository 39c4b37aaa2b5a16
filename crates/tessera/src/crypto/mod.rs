//! Key management and block encryption
//!
//! - **Keys**: every private node has its own ChaCha20-Poly1305 [`Secret`].
//!   A private directory records each child's secret in the (encrypted)
//!   link pointing at that child, so holding the root key is enough to
//!   walk the whole private subtree.
//! - **Key storage**: named keys come from a [`KeyStore`]; the
//!   [`KeyManager`] is the handle callers hold.

mod keystore;
mod manager;
mod secret;

pub use keystore::{KeyStore, KeyStoreError, MemoryKeyStore};
pub use manager::KeyManager;
pub use secret::{Secret, SecretError, NONCE_SIZE, SECRET_SIZE, TAG_SIZE};
