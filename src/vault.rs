//! Password-protected key storage.
//!
//! The vault never owns durable storage. It serializes each entry to JSON and
//! hands it to a collaborator-supplied [`KeyStore`] under a namespaced key:
//!
//! ```text
//! "{namespace}:{id}" => {
//!     "encrypted": {"ciphertext": <b64>, "iv": <b64>, "algorithm": "AES-GCM"},
//!     "salt": <b64>,
//!     "iterations": 100000,
//!     "timestamp": <ISO-8601>
//! }
//! ```
//!
//! The store serializes access; the vault treats each read and write as an
//! independent request. Two concurrent `store_key` calls for the same id race.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::MIN_PBKDF2_ITERATIONS;
use crate::encoding::base64_bytes;
use crate::engine::Engine;
use crate::error::{CryptoError, Result};
use crate::keys::{KeyHandle, SymmetricKey};
use crate::provider::PrimitiveProvider;
use crate::symmetric::EncryptedBlob;

/// Durable string storage owned by the collaborator.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, String>;

    async fn put(&self, key: &str, value: String) -> std::result::Result<(), String>;

    /// Returns whether anything was removed.
    async fn delete(&self, key: &str) -> std::result::Result<bool, String>;
}

/// A process-local [`KeyStore`], mostly for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Raw stored value, exactly as the vault wrote it.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, String> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> std::result::Result<(), String> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> std::result::Result<bool, String> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}

fn default_iterations() -> u32 {
    MIN_PBKDF2_ITERATIONS
}

/// One persisted, password-wrapped key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVaultEntry {
    #[serde(rename = "encrypted")]
    pub encrypted_key_material: EncryptedBlob,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    pub timestamp: DateTime<Utc>,
}

/// Vault operations bound to one engine and one store.
pub struct KeyVault<'a, P: PrimitiveProvider, S: KeyStore + ?Sized> {
    engine: &'a Engine<P>,
    store: &'a S,
}

impl<P: PrimitiveProvider> Engine<P> {
    pub fn vault<'a, S: KeyStore + ?Sized>(&'a self, store: &'a S) -> KeyVault<'a, P, S> {
        KeyVault {
            engine: self,
            store,
        }
    }
}

impl<'a, P: PrimitiveProvider, S: KeyStore + ?Sized> KeyVault<'a, P, S> {
    fn storage_key(&self, id: &str) -> String {
        format!("{}:{}", self.engine.config().vault_namespace, id)
    }

    /// Wrap `key` under a key derived from `password` and persist it as `id`.
    ///
    /// Only exportable symmetric keys can be stored.
    pub async fn store_key(&self, id: &str, key: &KeyHandle, password: &str) -> Result<()> {
        let material = key.export_symmetric()?;

        let wrapping = self.engine.derive_key_from_password(password, None).await?;
        let encrypted = self.engine.encrypt(&material, &wrapping.key).await?;

        let entry = KeyVaultEntry {
            encrypted_key_material: encrypted,
            salt: wrapping.salt,
            iterations: wrapping.iterations,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&entry).map_err(|e| CryptoError::Storage(e.to_string()))?;

        self.store
            .put(&self.storage_key(id), json)
            .await
            .map_err(CryptoError::Storage)?;
        info!(id, "key stored in vault");
        Ok(())
    }

    /// Load and unwrap the key stored as `id`. The result is non-exportable.
    pub async fn retrieve_key(&self, id: &str, password: &str) -> Result<KeyHandle> {
        let entry = self.entry(id).await?;

        let wrapping = self
            .engine
            .derive_stored_key(password, &entry.salt, entry.iterations)
            .await?;
        let material = self
            .engine
            .decrypt(&entry.encrypted_key_material, &wrapping)
            .await?;
        let key = SymmetricKey::from_slice(&material).ok_or(CryptoError::DecryptionFailure)?;

        debug!(id, "key retrieved from vault");
        Ok(KeyHandle::symmetric(key, false))
    }

    /// The persisted entry for `id`, still encrypted.
    pub async fn entry(&self, id: &str) -> Result<KeyVaultEntry> {
        let raw = self
            .store
            .get(&self.storage_key(id))
            .await
            .map_err(CryptoError::Storage)?
            .ok_or_else(|| CryptoError::KeyNotFound(id.to_string()))?;
        serde_json::from_str(&raw).map_err(|_| CryptoError::Storage("malformed vault entry".to_string()))
    }

    pub async fn contains_key(&self, id: &str) -> Result<bool> {
        let raw = self
            .store
            .get(&self.storage_key(id))
            .await
            .map_err(CryptoError::Storage)?;
        Ok(raw.is_some())
    }

    /// Delete the entry for `id`. Returns whether one existed.
    pub async fn revoke_key(&self, id: &str) -> Result<bool> {
        let removed = self
            .store
            .delete(&self.storage_key(id))
            .await
            .map_err(CryptoError::Storage)?;
        info!(id, removed, "vault key revoked");
        Ok(removed)
    }
}
