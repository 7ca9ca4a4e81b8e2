//! Password-protected file encryption.
//!
//! ```text
//! encrypt_file(bytes, meta, password)
//!   1. key, salt  = PBKDF2(password)
//!   2. fingerprint(bytes)                 -- over plaintext, before encryption
//!   3. encryptedContent  = AES-GCM(key, bytes)
//!   4. encryptedMetadata = AES-GCM(key, JSON{name, size, type, timestamp, algorithm})
//! ```
//!
//! Content and metadata are sealed under independent IVs. Decryption opens the
//! metadata first, then the content; either failing is `DecryptionFailure`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::algorithm::SymmetricAlgorithm;
use crate::config::MIN_PBKDF2_ITERATIONS;
use crate::encoding::base64_bytes;
use crate::engine::Engine;
use crate::error::{CryptoError, Result};
use crate::fingerprint::FileFingerprint;
use crate::provider::PrimitiveProvider;
use crate::symmetric::EncryptedBlob;

/// What the collaborator knows about a file before it is encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub media_type: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
        }
    }
}

/// The metadata record sealed alongside the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub original_name: String,
    pub size: u64,
    pub media_type: String,
    pub timestamp: DateTime<Utc>,
    pub algorithm: SymmetricAlgorithm,
}

fn default_iterations() -> u32 {
    MIN_PBKDF2_ITERATIONS
}

/// An encrypted file bundle, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedFile {
    pub encrypted_content: EncryptedBlob,
    pub encrypted_metadata: EncryptedBlob,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    pub fingerprint: FileFingerprint,
}

/// Plaintext recovered from an [`EncryptedFile`].
#[derive(Debug)]
pub struct DecryptedFile {
    pub content: Zeroizing<Vec<u8>>,
    pub metadata: FileMetadata,
}

impl<P: PrimitiveProvider> Engine<P> {
    pub async fn encrypt_file(
        &self,
        data: &[u8],
        meta: &FileMeta,
        password: &str,
    ) -> Result<EncryptedFile> {
        let derived = self.derive_key_from_password(password, None).await?;
        let fingerprint = self.fingerprint(data).await?;

        let encrypted_content = self.encrypt(data, &derived.key).await?;

        let metadata = FileMetadata {
            original_name: meta.name.clone(),
            size: data.len() as u64,
            media_type: meta.media_type.clone(),
            timestamp: Utc::now(),
            algorithm: self.config().symmetric,
        };
        let record = Zeroizing::new(
            serde_json::to_vec(&metadata).map_err(|_| CryptoError::EncryptionFailure)?,
        );
        let encrypted_metadata = self.encrypt(&record, &derived.key).await?;

        Ok(EncryptedFile {
            encrypted_content,
            encrypted_metadata,
            salt: derived.salt,
            iterations: derived.iterations,
            fingerprint,
        })
    }

    /// Re-derive the key from the stored salt and open metadata, then content.
    pub async fn decrypt_file(&self, file: &EncryptedFile, password: &str) -> Result<DecryptedFile> {
        let key = self
            .derive_stored_key(password, &file.salt, file.iterations)
            .await?;

        let record = self.decrypt(&file.encrypted_metadata, &key).await?;
        let metadata: FileMetadata =
            serde_json::from_slice(&record).map_err(|_| CryptoError::DecryptionFailure)?;
        let content = self.decrypt(&file.encrypted_content, &key).await?;

        Ok(DecryptedFile { content, metadata })
    }

    /// [`decrypt_file`](Self::decrypt_file) followed by a fingerprint check.
    ///
    /// Fails with `IntegrityMismatch` if the content does not match the stored
    /// fingerprint or the size recorded in the sealed metadata.
    pub async fn decrypt_file_verified(
        &self,
        file: &EncryptedFile,
        password: &str,
    ) -> Result<DecryptedFile> {
        let decrypted = self.decrypt_file(file, password).await?;
        if decrypted.metadata.size != decrypted.content.len() as u64 {
            return Err(CryptoError::IntegrityMismatch);
        }
        self.ensure_integrity(&decrypted.content, &file.fingerprint).await?;
        Ok(decrypted)
    }
}
