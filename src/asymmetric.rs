//! RSA key pairs.
//!
//! Public keys travel as base64 of their SubjectPublicKeyInfo DER encoding.
//! Private keys are created non-exportable and this module offers no way to
//! export them.
//!
//! The same pairs sign content with RSA-PSS (SHA-256, MGF1-SHA256), giving
//! readers authenticity on top of confidentiality.

use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tracing::debug;

use crate::encoding::{from_base64, to_base64};
use crate::engine::{wrap, Engine};
use crate::error::{CryptoError, Result};
use crate::keys::{KeyHandle, KeyPair};
use crate::provider::PrimitiveProvider;

impl<P: PrimitiveProvider> Engine<P> {
    /// Generate an RSA-4096 key pair with e = 65537.
    pub async fn generate_asymmetric_key_pair(&self) -> Result<KeyPair> {
        let algorithm = self.config().asymmetric;
        let private = self
            .provider()
            .rsa_generate(algorithm.modulus_bits(), algorithm.public_exponent())
            .await
            .map_err(wrap(CryptoError::EncryptionFailure))?;
        let public = RsaPublicKey::from(&private);

        Ok(KeyPair {
            public: KeyHandle::public(public),
            private: KeyHandle::private(private),
        })
    }

    /// Base64 SPKI encoding of the pair's public half.
    pub fn export_public_key(&self, pair: &KeyPair) -> Result<String> {
        self.export_public_handle(&pair.public)
    }

    /// Base64 SPKI encoding of a public key handle.
    pub fn export_public_handle(&self, public: &KeyHandle) -> Result<String> {
        let der = public
            .public_key()?
            .to_public_key_der()
            .map_err(|_| CryptoError::InvalidKey)?;
        Ok(to_base64(der.as_bytes()))
    }

    /// Parse a base64 SPKI public key. The handle can only encrypt.
    ///
    /// Keys whose modulus is not the configured size are rejected.
    pub fn import_public_key(&self, encoded: &str) -> Result<KeyHandle> {
        let der = from_base64(encoded).ok_or(CryptoError::InvalidKey)?;
        let key = RsaPublicKey::from_public_key_der(&der).map_err(|_| CryptoError::InvalidKey)?;
        if key.size() * 8 != self.config().asymmetric.modulus_bits() {
            return Err(CryptoError::InvalidKey);
        }
        Ok(KeyHandle::public(key))
    }

    /// Sign `data` with a private key handle.
    pub async fn sign(&self, data: &[u8], private: &KeyHandle) -> Result<Vec<u8>> {
        let key = private.private_key()?;
        self.provider()
            .rsa_pss_sign(key, data)
            .await
            .map_err(wrap(CryptoError::SigningFailure))
    }

    /// Whether `signature` is a valid signature of `data` under `public`.
    ///
    /// A bad signature is `Ok(false)`; only a wrong-role handle or a missing
    /// primitive is an error.
    pub async fn verify_signature(
        &self,
        data: &[u8],
        signature: &[u8],
        public: &KeyHandle,
    ) -> Result<bool> {
        let key = public.public_key()?;
        let valid = self
            .provider()
            .rsa_pss_verify(key, data, signature)
            .await
            .map_err(wrap(CryptoError::InvalidKey))?;
        if !valid {
            debug!("signature did not verify");
        }
        Ok(valid)
    }
}
