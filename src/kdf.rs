//! Password-based key derivation.
//!
//! ```text
//! PBKDF2-HMAC-SHA256(
//!     password   = UTF-8 bytes of the password,
//!     salt       = 16 random bytes (or the stored salt),
//!     iterations = 100 000 for new keys (or the stored count),
//!     dkLen      = 32
//! )
//! ```
//!
//! The result is always a non-exportable symmetric [`KeyHandle`]. No password
//! policy lives here; weak passwords are the collaborator's concern.
//!
//! Counts read back from stored records are bounded by
//! `kdf.max_iterations` before any work is done.

use std::num::NonZeroU32;

use tracing::warn;

use crate::algorithm::HashAlgorithm;
use crate::engine::{wrap, Engine};
use crate::error::{CryptoError, Result};
use crate::keys::{KeyHandle, SymmetricKey};
use crate::provider::PrimitiveProvider;

/// A derived key together with the parameters needed to derive it again.
#[derive(Debug)]
pub struct DerivedKey {
    pub key: KeyHandle,
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl<P: PrimitiveProvider> Engine<P> {
    /// Derive a key from `password`, generating a fresh salt when none is given.
    pub async fn derive_key_from_password(
        &self,
        password: &str,
        salt: Option<&[u8]>,
    ) -> Result<DerivedKey> {
        let iterations = self.config().kdf.iterations;
        let salt = match salt {
            Some(salt) => salt.to_vec(),
            None => self
                .random_bytes(self.config().kdf.salt_len)
                .await
                .map_err(|_| CryptoError::KeyDerivationFailure)?,
        };
        let key = self.derive_key_with_iterations(password, &salt, iterations).await?;
        Ok(DerivedKey {
            key,
            salt,
            iterations,
        })
    }

    /// Re-derive a key under explicitly stored parameters.
    ///
    /// Used to open records written under an older iteration count, so any
    /// non-zero count up to `kdf.max_iterations` is accepted here; only new
    /// derivations obey the floor.
    pub async fn derive_key_with_iterations(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<KeyHandle> {
        if iterations > self.config().kdf.max_iterations {
            warn!(iterations, "iteration count above configured ceiling");
            return Err(CryptoError::KeyDerivationFailure);
        }
        let iterations = NonZeroU32::new(iterations).ok_or(CryptoError::KeyDerivationFailure)?;
        let bytes = self
            .provider()
            .pbkdf2_derive(password.as_bytes(), salt, iterations, HashAlgorithm::Sha256)
            .await
            .map_err(wrap(CryptoError::KeyDerivationFailure))?;
        Ok(KeyHandle::symmetric(SymmetricKey::from_bytes(*bytes), false))
    }

    /// Re-derive the key protecting a stored record.
    ///
    /// A stored count that cannot be derived is indistinguishable from a wrong
    /// password: both are `DecryptionFailure`.
    pub(crate) async fn derive_stored_key(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<KeyHandle> {
        self.derive_key_with_iterations(password, salt, iterations)
            .await
            .map_err(|e| match e {
                CryptoError::PrimitiveUnavailable(p) => CryptoError::PrimitiveUnavailable(p),
                _ => CryptoError::DecryptionFailure,
            })
    }
}
