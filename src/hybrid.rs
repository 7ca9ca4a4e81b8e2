//! Hybrid encryption.
//!
//! RSA-OAEP cannot carry payloads larger than its modulus allows, so bulk data
//! is sealed under a one-off AES-256 key and only that key is wrapped for the
//! recipient:
//!
//! ```text
//! ephemeral = 32 random bytes
//! encryptedData = AES-256-GCM(ephemeral, data)
//! encryptedKey  = RSA-OAEP-SHA256(recipient, ephemeral)
//! ```
//!
//! The ephemeral key is never exportable and is zeroised as soon as it has
//! been wrapped.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::algorithm::HybridAlgorithm;
use crate::encoding::base64_bytes;
use crate::engine::{wrap, Engine};
use crate::error::{CryptoError, Result};
use crate::keys::{KeyHandle, SymmetricKey};
use crate::provider::PrimitiveProvider;
use crate::symmetric::EncryptedBlob;

/// A payload sealed for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridBundle {
    #[serde(with = "base64_bytes")]
    pub encrypted_key: Vec<u8>,
    pub encrypted_data: EncryptedBlob,
    pub algorithm: HybridAlgorithm,
}

impl<P: PrimitiveProvider> Engine<P> {
    /// Seal `data` so only the holder of the matching private key can open it.
    pub async fn encrypt_hybrid(&self, data: &[u8], recipient: &KeyHandle) -> Result<HybridBundle> {
        let public = recipient.public_key()?;

        let ephemeral = self.fresh_symmetric_key().await?;
        let encrypted_data = self.encrypt_with(data, &ephemeral).await?;
        let encrypted_key = self
            .provider()
            .rsa_oaep_encrypt(public, ephemeral.as_bytes())
            .await
            .map_err(wrap(CryptoError::EncryptionFailure))?;
        drop(ephemeral);

        Ok(HybridBundle {
            encrypted_key,
            encrypted_data,
            algorithm: HybridAlgorithm::RsaOaepAesGcm,
        })
    }

    /// Unwrap the ephemeral key with `recipient` and open the payload.
    ///
    /// A non-matching private key, a corrupted wrapped key and a tampered
    /// payload all fail with `DecryptionFailure`.
    pub async fn decrypt_hybrid(
        &self,
        bundle: &HybridBundle,
        recipient: &KeyHandle,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let private = recipient.private_key().map_err(|_| CryptoError::DecryptionFailure)?;

        let raw = self
            .provider()
            .rsa_oaep_decrypt(private, &bundle.encrypted_key)
            .await
            .map_err(wrap(CryptoError::DecryptionFailure))?;
        let ephemeral = SymmetricKey::from_slice(&raw).ok_or(CryptoError::DecryptionFailure)?;
        drop(raw);

        self.decrypt_with(&bundle.encrypted_data, &ephemeral).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hybrid_roundtrip_and_wrong_recipient() {
        let engine = Engine::with_defaults().unwrap();
        let alice = engine.generate_asymmetric_key_pair().await.unwrap();
        let mallory = engine.generate_asymmetric_key_pair().await.unwrap();

        // Larger than any single RSA-4096 OAEP block.
        let payload = vec![0x5Au8; 64 * 1024];
        let bundle = engine.encrypt_hybrid(&payload, &alice.public).await.unwrap();
        assert_eq!(bundle.encrypted_key.len(), 512);

        let opened = engine.decrypt_hybrid(&bundle, &alice.private).await.unwrap();
        assert_eq!(opened.as_slice(), payload.as_slice());

        assert_eq!(
            engine.decrypt_hybrid(&bundle, &mallory.private).await.unwrap_err(),
            CryptoError::DecryptionFailure
        );

        // Keys in the wrong role are refused up front.
        assert_eq!(
            engine.encrypt_hybrid(b"x", &alice.private).await.unwrap_err(),
            CryptoError::InvalidKey
        );
        assert_eq!(
            engine.decrypt_hybrid(&bundle, &alice.public).await.unwrap_err(),
            CryptoError::DecryptionFailure
        );
    }

    #[test]
    fn test_bundle_field_names() {
        let bundle = HybridBundle {
            encrypted_key: vec![0xFF],
            encrypted_data: EncryptedBlob {
                ciphertext: vec![],
                iv: [0u8; 12],
                algorithm: Default::default(),
            },
            algorithm: HybridAlgorithm::RsaOaepAesGcm,
        };
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["encryptedKey"], "/w==");
        assert_eq!(json["algorithm"], "RSA-4096-OAEP+AES-256-GCM");
        assert!(json["encryptedData"]["iv"].is_string());
    }
}
