//! Error types for presscrypt.
//!
//! Every variant is a distinct failure mode visible to the collaborator. Messages
//! are intentionally minimal: they signal *what* failed without revealing *why*
//! in ways that could leak cryptographic state. Raw provider errors
//! ([`PrimitiveError`](crate::provider::PrimitiveError)) are mapped into one of
//! these before they leave the engine.

use thiserror::Error;

use crate::provider::Primitive;

/// The single error type for all presscrypt operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The host provider lacks a required primitive. Fatal; reported at start-up.
    #[error("primitive unavailable: {0}")]
    PrimitiveUnavailable(Primitive),

    /// Password-based key derivation failed at the primitive level.
    #[error("key derivation failed")]
    KeyDerivationFailure,

    /// Encryption failed.
    #[error("encryption failed")]
    EncryptionFailure,

    /// Decryption failed. Covers wrong key, wrong password, tampered ciphertext
    /// and corrupted tags alike; the cases are deliberately indistinguishable.
    #[error("decryption failed")]
    DecryptionFailure,

    /// Producing a signature failed.
    #[error("signing failed")]
    SigningFailure,

    /// Decrypted content does not match its recorded fingerprint.
    #[error("integrity mismatch")]
    IntegrityMismatch,

    /// No vault entry exists under the given identifier.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A key was used in the wrong role, or an encoded key could not be parsed.
    #[error("invalid key")]
    InvalidKey,

    /// The key handle was created non-exportable.
    #[error("key is not exportable")]
    KeyNotExportable,

    /// The engine configuration was rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The collaborator's storage failed or returned a malformed entry.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CryptoError>;
