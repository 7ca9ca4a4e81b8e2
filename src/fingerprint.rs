//! Plaintext fingerprints.
//!
//! A fingerprint is computed once, over the original plaintext, before any
//! encryption. It records SHA-256 and SHA-512 digests plus the byte length,
//! so a caller can later prove the content it decrypted is the content that
//! was encrypted. Fingerprints without a SHA-512 digest (`{hash, size,
//! timestamp}`) are still accepted and checked on SHA-256 and size alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::algorithm::HashAlgorithm;
use crate::encoding::hex_bytes;
use crate::engine::Engine;
use crate::error::{CryptoError, Result};
use crate::provider::PrimitiveProvider;

/// Tamper-evident summary of a plaintext.
///
/// Equality compares content identity (digests and size). The timestamp only
/// records when the fingerprint was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFingerprint {
    #[serde(with = "hex_bytes")]
    pub hash: Vec<u8>,
    /// Empty when the fingerprint was recorded without it.
    #[serde(default, with = "hex_bytes")]
    pub sha512: Vec<u8>,
    pub size: u64,
    pub timestamp: DateTime<Utc>,
}

impl PartialEq for FileFingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.hash == other.hash && self.sha512 == other.sha512
    }
}

impl Eq for FileFingerprint {}

impl<P: PrimitiveProvider> Engine<P> {
    pub async fn fingerprint(&self, data: &[u8]) -> Result<FileFingerprint> {
        Ok(FileFingerprint {
            hash: self.hash(HashAlgorithm::Sha256, data).await?,
            sha512: self.hash(HashAlgorithm::Sha512, data).await?,
            size: data.len() as u64,
            timestamp: Utc::now(),
        })
    }

    /// Whether `data` is exactly the content `expected` was taken over.
    pub async fn verify_integrity(&self, data: &[u8], expected: &FileFingerprint) -> Result<bool> {
        if data.len() as u64 != expected.size {
            return Ok(false);
        }
        if self.hash(HashAlgorithm::Sha256, data).await? != expected.hash {
            return Ok(false);
        }
        if expected.sha512.is_empty() {
            return Ok(true);
        }
        Ok(self.hash(HashAlgorithm::Sha512, data).await? == expected.sha512)
    }

    /// Like [`verify_integrity`](Self::verify_integrity), but a mismatch is an error.
    pub async fn ensure_integrity(&self, data: &[u8], expected: &FileFingerprint) -> Result<()> {
        if self.verify_integrity(data, expected).await? {
            Ok(())
        } else {
            warn!(expected_size = expected.size, actual_size = data.len(), "integrity mismatch");
            Err(CryptoError::IntegrityMismatch)
        }
    }
}
