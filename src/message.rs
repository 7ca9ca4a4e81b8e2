//! Short structured messages.
//!
//! A message is a hybrid bundle plus a random identifier and a send
//! timestamp. Each call produces one complete, immutable record; drafts and
//! partial sends belong to the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::engine::Engine;
use crate::error::{CryptoError, Result};
use crate::hybrid::HybridBundle;
use crate::keys::KeyHandle;
use crate::provider::PrimitiveProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedMessage {
    #[serde(flatten)]
    pub bundle: HybridBundle,
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl<P: PrimitiveProvider> Engine<P> {
    pub async fn encrypt_message(&self, message: &str, recipient: &KeyHandle) -> Result<EncryptedMessage> {
        let bundle = self.encrypt_hybrid(message.as_bytes(), recipient).await?;

        let id_bytes: [u8; 16] = self
            .random_bytes(16)
            .await?
            .try_into()
            .map_err(|_| CryptoError::EncryptionFailure)?;

        Ok(EncryptedMessage {
            bundle,
            message_id: uuid::Builder::from_random_bytes(id_bytes).into_uuid(),
            timestamp: Utc::now(),
        })
    }

    /// Open a message. Non-UTF-8 plaintext is treated as a failed decryption.
    pub async fn decrypt_message(&self, message: &EncryptedMessage, recipient: &KeyHandle) -> Result<String> {
        let mut plain = self.decrypt_hybrid(&message.bundle, recipient).await?;
        String::from_utf8(std::mem::take(&mut *plain)).map_err(|e| {
            e.into_bytes().zeroize();
            CryptoError::DecryptionFailure
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_unique_v4() {
        let engine = Engine::with_defaults().unwrap();
        let pair = engine.generate_asymmetric_key_pair().await.unwrap();

        let a = engine.encrypt_message("one", &pair.public).await.unwrap();
        let b = engine.encrypt_message("one", &pair.public).await.unwrap();
        assert_ne!(a.message_id, b.message_id);
        assert_eq!(a.message_id.get_version_num(), 4);

        let json = serde_json::to_value(&a).unwrap();
        assert!(json["encryptedKey"].is_string());
        assert!(json["encryptedData"].is_object());
        assert_eq!(json["algorithm"], "RSA-4096-OAEP+AES-256-GCM");
        assert!(json["messageId"].is_string());

        let restored: EncryptedMessage = serde_json::from_value(json).unwrap();
        assert_eq!(engine.decrypt_message(&restored, &pair.private).await.unwrap(), "one");

        // A bundle whose plaintext is not UTF-8 opens as a failed decryption.
        let binary = EncryptedMessage {
            bundle: engine.encrypt_hybrid(&[0xff, 0xfe], &pair.public).await.unwrap(),
            ..restored
        };
        assert_eq!(
            engine.decrypt_message(&binary, &pair.private).await.unwrap_err(),
            CryptoError::DecryptionFailure
        );
    }
}
