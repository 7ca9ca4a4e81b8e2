//! The closed set of algorithms the engine speaks.
//!
//! Each enum serializes to the tag that appears in persisted records, so a
//! record written today names exactly which construction produced it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Size of an AES-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Symmetric authenticated ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SymmetricAlgorithm {
    /// AES-256 in Galois/Counter Mode with a 96-bit nonce and 128-bit tag.
    #[default]
    #[serde(rename = "AES-GCM")]
    Aes256Gcm,
}

impl SymmetricAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES-GCM",
        }
    }

    /// Nonce length the algorithm requires.
    pub fn nonce_len(&self) -> usize {
        match self {
            Self::Aes256Gcm => NONCE_LEN,
        }
    }
}

/// Asymmetric encryption schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AsymmetricAlgorithm {
    /// RSA with a 4096-bit modulus, e = 65537, OAEP padding over SHA-256.
    #[default]
    #[serde(rename = "RSA-OAEP-4096-SHA256")]
    RsaOaep4096Sha256,
}

impl AsymmetricAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsaOaep4096Sha256 => "RSA-OAEP-4096-SHA256",
        }
    }

    pub fn modulus_bits(&self) -> usize {
        match self {
            Self::RsaOaep4096Sha256 => 4096,
        }
    }

    pub fn public_exponent(&self) -> u32 {
        match self {
            Self::RsaOaep4096Sha256 => 65_537,
        }
    }
}

/// The hybrid construction tag attached to every hybrid bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HybridAlgorithm {
    #[default]
    #[serde(rename = "RSA-4096-OAEP+AES-256-GCM")]
    RsaOaepAesGcm,
}

impl HybridAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsaOaepAesGcm => "RSA-4096-OAEP+AES-256-GCM",
        }
    }
}

/// Digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        }
    }

    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(SymmetricAlgorithm, AsymmetricAlgorithm, HybridAlgorithm, HashAlgorithm);
