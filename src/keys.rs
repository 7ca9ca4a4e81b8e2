//! Key handles and ownership.
//!
//! A [`KeyHandle`] is the only way key material moves through the engine. It is
//! opaque to collaborators: raw bytes are reachable only through `pub(crate)`
//! accessors, and only exportable handles may hand their material back out.
//!
//! - Not `Clone`. A handle cannot be duplicated without an explicit export.
//! - Symmetric material is zeroised on drop; `rsa` zeroises private keys itself.
//! - `Debug` prints the role and export flag, never material.

use std::fmt;

use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::algorithm::KEY_LEN;
use crate::error::{CryptoError, Result};

/// What a handle may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Symmetric,
    AsymmetricPublic,
    AsymmetricPrivate,
}

/// Raw AES-256 key bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Copy from a slice, rejecting anything that is not exactly 32 bytes.
    pub(crate) fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

pub(crate) enum KeyMaterial {
    Symmetric(SymmetricKey),
    Public(RsaPublicKey),
    Private(RsaPrivateKey),
}

/// An opaque reference to a symmetric or asymmetric key.
pub struct KeyHandle {
    exportable: bool,
    material: KeyMaterial,
}

impl KeyHandle {
    pub(crate) fn symmetric(key: SymmetricKey, exportable: bool) -> Self {
        Self {
            exportable,
            material: KeyMaterial::Symmetric(key),
        }
    }

    /// Public keys are always shareable.
    pub(crate) fn public(key: RsaPublicKey) -> Self {
        Self {
            exportable: true,
            material: KeyMaterial::Public(key),
        }
    }

    /// Private keys are always created non-exportable.
    pub(crate) fn private(key: RsaPrivateKey) -> Self {
        Self {
            exportable: false,
            material: KeyMaterial::Private(key),
        }
    }

    pub fn role(&self) -> KeyRole {
        match self.material {
            KeyMaterial::Symmetric(_) => KeyRole::Symmetric,
            KeyMaterial::Public(_) => KeyRole::AsymmetricPublic,
            KeyMaterial::Private(_) => KeyRole::AsymmetricPrivate,
        }
    }

    /// Whether the raw material may leave the engine.
    pub fn is_exportable(&self) -> bool {
        self.exportable
    }

    pub(crate) fn symmetric_key(&self) -> Result<&SymmetricKey> {
        match &self.material {
            KeyMaterial::Symmetric(key) => Ok(key),
            _ => Err(CryptoError::InvalidKey),
        }
    }

    pub(crate) fn public_key(&self) -> Result<&RsaPublicKey> {
        match &self.material {
            KeyMaterial::Public(key) => Ok(key),
            _ => Err(CryptoError::InvalidKey),
        }
    }

    pub(crate) fn private_key(&self) -> Result<&RsaPrivateKey> {
        match &self.material {
            KeyMaterial::Private(key) => Ok(key),
            _ => Err(CryptoError::InvalidKey),
        }
    }

    /// Raw symmetric material, gated on the export flag.
    pub(crate) fn export_symmetric(&self) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.symmetric_key()?;
        if !self.exportable {
            return Err(CryptoError::KeyNotExportable);
        }
        Ok(Zeroizing::new(key.as_bytes().to_vec()))
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("role", &self.role())
            .field("exportable", &self.exportable)
            .finish_non_exhaustive()
    }
}

/// A freshly generated asymmetric key pair.
#[derive(Debug)]
pub struct KeyPair {
    pub public: KeyHandle,
    pub private: KeyHandle,
}
