//! Authenticated symmetric encryption.
//!
//! AES-256-GCM with a fresh 96-bit IV drawn from the provider on every call.
//! Callers never supply an IV. The ciphertext carries the 128-bit tag
//! appended, so the record is `{ciphertext || tag, iv, algorithm}`.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::algorithm::{SymmetricAlgorithm, KEY_LEN, NONCE_LEN};
use crate::encoding::{base64_array, base64_bytes};
use crate::engine::{wrap, Engine};
use crate::error::{CryptoError, Result};
use crate::keys::{KeyHandle, SymmetricKey};
use crate::provider::PrimitiveProvider;

/// An AES-GCM ciphertext with the IV it was sealed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_array")]
    pub iv: [u8; NONCE_LEN],
    pub algorithm: SymmetricAlgorithm,
}

impl<P: PrimitiveProvider> Engine<P> {
    /// A fresh, exportable AES-256 key.
    pub async fn generate_symmetric_key(&self) -> Result<KeyHandle> {
        let key = self.fresh_symmetric_key().await?;
        Ok(KeyHandle::symmetric(key, true))
    }

    pub(crate) async fn fresh_symmetric_key(&self) -> Result<SymmetricKey> {
        let bytes = Zeroizing::new(self.random_bytes(KEY_LEN).await?);
        SymmetricKey::from_slice(&bytes).ok_or(CryptoError::EncryptionFailure)
    }

    /// Seal `data` under `key` with a newly generated IV.
    pub async fn encrypt(&self, data: &[u8], key: &KeyHandle) -> Result<EncryptedBlob> {
        self.encrypt_with(data, key.symmetric_key()?).await
    }

    pub(crate) async fn encrypt_with(&self, data: &[u8], key: &SymmetricKey) -> Result<EncryptedBlob> {
        let iv: [u8; NONCE_LEN] = self
            .random_bytes(NONCE_LEN)
            .await?
            .try_into()
            .map_err(|_| CryptoError::EncryptionFailure)?;

        let ciphertext = self
            .provider()
            .aes_gcm_encrypt(key.as_bytes(), &iv, data)
            .await
            .map_err(wrap(CryptoError::EncryptionFailure))?;

        Ok(EncryptedBlob {
            ciphertext,
            iv,
            algorithm: SymmetricAlgorithm::Aes256Gcm,
        })
    }

    /// Open `blob` under `key`.
    ///
    /// Wrong key and tampered ciphertext both yield `DecryptionFailure`; no
    /// partial plaintext is ever returned.
    pub async fn decrypt(&self, blob: &EncryptedBlob, key: &KeyHandle) -> Result<Zeroizing<Vec<u8>>> {
        let key = key.symmetric_key().map_err(|_| CryptoError::DecryptionFailure)?;
        self.decrypt_with(blob, key).await
    }

    pub(crate) async fn decrypt_with(
        &self,
        blob: &EncryptedBlob,
        key: &SymmetricKey,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.provider()
            .aes_gcm_decrypt(key.as_bytes(), &blob.iv, &blob.ciphertext)
            .await
            .map_err(wrap(CryptoError::DecryptionFailure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::TAG_LEN;

    #[tokio::test]
    async fn test_roundtrip() {
        let engine = Engine::with_defaults().unwrap();
        let key = engine.generate_symmetric_key().await.unwrap();
        let blob = engine.encrypt(b"dispatch from the field", &key).await.unwrap();

        assert_eq!(blob.ciphertext.len(), b"dispatch from the field".len() + TAG_LEN);
        let plain = engine.decrypt(&blob, &key).await.unwrap();
        assert_eq!(plain.as_slice(), b"dispatch from the field");
    }

    #[tokio::test]
    async fn test_empty_payload_roundtrip() {
        let engine = Engine::with_defaults().unwrap();
        let key = engine.generate_symmetric_key().await.unwrap();
        let blob = engine.encrypt(b"", &key).await.unwrap();
        assert!(engine.decrypt(&blob, &key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_iv_never_repeats() {
        let engine = Engine::with_defaults().unwrap();
        let key = engine.generate_symmetric_key().await.unwrap();
        let a = engine.encrypt(b"same", &key).await.unwrap();
        let b = engine.encrypt(b"same", &key).await.unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[tokio::test]
    async fn test_wrong_key_fails() {
        let engine = Engine::with_defaults().unwrap();
        let key = engine.generate_symmetric_key().await.unwrap();
        let other = engine.generate_symmetric_key().await.unwrap();
        let blob = engine.encrypt(b"secret", &key).await.unwrap();
        assert_eq!(
            engine.decrypt(&blob, &other).await.unwrap_err(),
            CryptoError::DecryptionFailure
        );
    }

    #[tokio::test]
    async fn test_truncated_ciphertext_fails() {
        let engine = Engine::with_defaults().unwrap();
        let key = engine.generate_symmetric_key().await.unwrap();
        let mut blob = engine.encrypt(b"secret", &key).await.unwrap();
        blob.ciphertext.truncate(4);
        assert_eq!(
            engine.decrypt(&blob, &key).await.unwrap_err(),
            CryptoError::DecryptionFailure
        );
    }

    #[test]
    fn test_blob_json_layout() {
        let blob = EncryptedBlob {
            ciphertext: vec![1, 2, 3],
            iv: [0u8; NONCE_LEN],
            algorithm: SymmetricAlgorithm::Aes256Gcm,
        };
        let json = serde_json::to_value(&blob).unwrap();
        assert_eq!(json["ciphertext"], "AQID");
        assert_eq!(json["iv"], "AAAAAAAAAAAAAAAA");
        assert_eq!(json["algorithm"], "AES-GCM");

        let mut short_iv = json.clone();
        short_iv["iv"] = "AAAA".into();
        assert!(serde_json::from_value::<EncryptedBlob>(short_iv).is_err());
    }
}
