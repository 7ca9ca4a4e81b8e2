//! Host-supplied cryptographic primitives.
//!
//! Every other module reaches randomness, AES-GCM, RSA-OAEP, RSA-PSS, PBKDF2
//! and SHA-2 exclusively through the [`PrimitiveProvider`] trait. The default
//! implementation, [`RingProvider`], uses `ring` for everything `ring` offers
//! and the `rsa` crate for RSA-OAEP and RSA-PSS.
//!
//! Providers must not stall the executor. `RingProvider` runs every CPU-bound
//! primitive on tokio's blocking pool when a runtime is present, and inline
//! otherwise. A host provider backed by its own async crypto API can simply
//! await it.
//!
//! Provider errors ([`PrimitiveError`]) carry detail for local debugging only.
//! The engine maps them into [`CryptoError`](crate::CryptoError) categories
//! before anything reaches a collaborator.

use std::fmt;
use std::num::NonZeroU32;

use async_trait::async_trait;
use rand::rngs::OsRng;
use ring::aead::{self, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::digest;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use rsa::{BigUint, Oaep, Pss, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::algorithm::{HashAlgorithm, KEY_LEN, NONCE_LEN};

/// The primitives an engine needs from its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    SecureRandom,
    AesGcm,
    RsaOaep,
    RsaPss,
    Pbkdf2,
    Sha256,
    Sha512,
}

impl Primitive {
    /// Everything [`Engine::new`](crate::Engine::new) checks for at start-up.
    pub const REQUIRED: [Primitive; 7] = [
        Primitive::SecureRandom,
        Primitive::AesGcm,
        Primitive::RsaOaep,
        Primitive::RsaPss,
        Primitive::Pbkdf2,
        Primitive::Sha256,
        Primitive::Sha512,
    ];
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SecureRandom => "secure-random",
            Self::AesGcm => "AES-256-GCM",
            Self::RsaOaep => "RSA-OAEP",
            Self::RsaPss => "RSA-PSS",
            Self::Pbkdf2 => "PBKDF2",
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        };
        f.write_str(name)
    }
}

/// Raw provider failure. Never crosses the engine boundary.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    #[error("{0} is not available on this host")]
    Unavailable(Primitive),

    #[error("{primitive} failed: {detail}")]
    Failed { primitive: Primitive, detail: String },
}

impl PrimitiveError {
    pub fn failed(primitive: Primitive, detail: impl Into<String>) -> Self {
        Self::Failed {
            primitive,
            detail: detail.into(),
        }
    }

    pub fn primitive(&self) -> Primitive {
        match self {
            Self::Unavailable(p) => *p,
            Self::Failed { primitive, .. } => *primitive,
        }
    }
}

/// A swappable source of cryptographic primitives.
///
/// Operations are asynchronous so that hosts backed by an async crypto API can
/// implement them without blocking; the engine never assumes they are
/// cancellable.
#[async_trait]
pub trait PrimitiveProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Capability probe run once when an engine is constructed.
    fn supports(&self, primitive: Primitive) -> bool;

    /// Fill a fresh buffer of `len` cryptographically secure random bytes.
    async fn random_bytes(&self, len: usize) -> Result<Vec<u8>, PrimitiveError>;

    async fn digest(&self, algorithm: HashAlgorithm, data: &[u8])
        -> Result<Vec<u8>, PrimitiveError>;

    /// AES-256-GCM seal. Output is ciphertext with the 16-byte tag appended.
    async fn aes_gcm_encrypt(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; NONCE_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError>;

    /// AES-256-GCM open. Fails if the tag does not verify.
    async fn aes_gcm_decrypt(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError>;

    async fn rsa_generate(
        &self,
        modulus_bits: usize,
        public_exponent: u32,
    ) -> Result<RsaPrivateKey, PrimitiveError>;

    /// RSA-OAEP with SHA-256 for both the label hash and MGF1.
    async fn rsa_oaep_encrypt(
        &self,
        key: &RsaPublicKey,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError>;

    async fn rsa_oaep_decrypt(
        &self,
        key: &RsaPrivateKey,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError>;

    /// RSA-PSS signature over the SHA-256 digest of `data`, MGF1-SHA256.
    async fn rsa_pss_sign(&self, key: &RsaPrivateKey, data: &[u8])
        -> Result<Vec<u8>, PrimitiveError>;

    /// `Ok(false)` for a signature that does not verify; `Err` only when the
    /// primitive itself cannot run.
    async fn rsa_pss_verify(
        &self,
        key: &RsaPublicKey,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool, PrimitiveError>;

    /// PBKDF2-HMAC producing a 256-bit key.
    async fn pbkdf2_derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: NonZeroU32,
        hash: HashAlgorithm,
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, PrimitiveError>;
}

// ---------------------------------------------------------------------------
// ring + rsa
// ---------------------------------------------------------------------------

/// The default provider.
///
/// `SystemRandom` is the randomness source for everything `ring` does; the
/// `rsa` crate draws from `OsRng`, which reads the same OS source.
pub struct RingProvider {
    rng: SystemRandom,
}

impl RingProvider {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, PrimitiveError> {
        let unbound = UnboundKey::new(&AES_256_GCM, key)
            .map_err(|_| PrimitiveError::failed(Primitive::AesGcm, "key rejected"))?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl Default for RingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrimitiveProvider for RingProvider {
    fn name(&self) -> &'static str {
        "ring"
    }

    fn supports(&self, _primitive: Primitive) -> bool {
        true
    }

    async fn random_bytes(&self, len: usize) -> Result<Vec<u8>, PrimitiveError> {
        let mut buf = vec![0u8; len];
        self.rng
            .fill(&mut buf)
            .map_err(|_| PrimitiveError::failed(Primitive::SecureRandom, "fill failed"))?;
        Ok(buf)
    }

    async fn digest(
        &self,
        algorithm: HashAlgorithm,
        data: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        let (alg, primitive) = match algorithm {
            HashAlgorithm::Sha256 => (&digest::SHA256, Primitive::Sha256),
            HashAlgorithm::Sha512 => (&digest::SHA512, Primitive::Sha512),
        };
        let data = data.to_vec();
        offload(primitive, move || Ok(digest::digest(alg, &data).as_ref().to_vec())).await
    }

    async fn aes_gcm_encrypt(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; NONCE_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        let key = Self::aead_key(key)?;
        let nonce = Nonce::assume_unique_for_key(*iv);

        let mut output = Vec::with_capacity(plaintext.len() + AES_256_GCM.tag_len());
        output.extend_from_slice(plaintext);
        offload(Primitive::AesGcm, move || {
            key.seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut output)
                .map_err(|_| PrimitiveError::failed(Primitive::AesGcm, "seal failed"))?;
            Ok(output)
        })
        .await
    }

    async fn aes_gcm_decrypt(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError> {
        let key = Self::aead_key(key)?;
        let nonce = Nonce::assume_unique_for_key(*iv);

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        offload(Primitive::AesGcm, move || {
            let plaintext_len = key
                .open_in_place(nonce, aead::Aad::empty(), &mut buffer[..])
                .map_err(|_| PrimitiveError::failed(Primitive::AesGcm, "tag mismatch"))?
                .len();
            buffer.truncate(plaintext_len);
            Ok(buffer)
        })
        .await
    }

    async fn rsa_generate(
        &self,
        modulus_bits: usize,
        public_exponent: u32,
    ) -> Result<RsaPrivateKey, PrimitiveError> {
        offload(Primitive::RsaOaep, move || {
            let exp = BigUint::from(public_exponent);
            RsaPrivateKey::new_with_exp(&mut OsRng, modulus_bits, &exp)
                .map_err(|e| PrimitiveError::failed(Primitive::RsaOaep, e.to_string()))
        })
        .await
    }

    async fn rsa_oaep_encrypt(
        &self,
        key: &RsaPublicKey,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        let key = key.clone();
        let plaintext = Zeroizing::new(plaintext.to_vec());
        offload(Primitive::RsaOaep, move || {
            key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), &plaintext)
                .map_err(|e| PrimitiveError::failed(Primitive::RsaOaep, e.to_string()))
        })
        .await
    }

    async fn rsa_oaep_decrypt(
        &self,
        key: &RsaPrivateKey,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError> {
        let key = key.clone();
        let ciphertext = ciphertext.to_vec();
        offload(Primitive::RsaOaep, move || {
            key.decrypt(Oaep::new::<Sha256>(), &ciphertext)
                .map(Zeroizing::new)
                .map_err(|e| PrimitiveError::failed(Primitive::RsaOaep, e.to_string()))
        })
        .await
    }

    async fn rsa_pss_sign(
        &self,
        key: &RsaPrivateKey,
        data: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        let key = key.clone();
        let hashed = Sha256::digest(data);
        offload(Primitive::RsaPss, move || {
            key.sign_with_rng(&mut OsRng, Pss::new::<Sha256>(), &hashed)
                .map_err(|e| PrimitiveError::failed(Primitive::RsaPss, e.to_string()))
        })
        .await
    }

    async fn rsa_pss_verify(
        &self,
        key: &RsaPublicKey,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool, PrimitiveError> {
        let key = key.clone();
        let hashed = Sha256::digest(data);
        let signature = signature.to_vec();
        offload(Primitive::RsaPss, move || {
            Ok(key.verify(Pss::new::<Sha256>(), &hashed, &signature).is_ok())
        })
        .await
    }

    async fn pbkdf2_derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: NonZeroU32,
        hash: HashAlgorithm,
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, PrimitiveError> {
        let alg = match hash {
            HashAlgorithm::Sha256 => pbkdf2::PBKDF2_HMAC_SHA256,
            HashAlgorithm::Sha512 => pbkdf2::PBKDF2_HMAC_SHA512,
        };
        let password = Zeroizing::new(password.to_vec());
        let salt = salt.to_vec();
        offload(Primitive::Pbkdf2, move || {
            let mut out = Zeroizing::new([0u8; KEY_LEN]);
            pbkdf2::derive(alg, iterations, &salt, &password, &mut out[..]);
            Ok(out)
        })
        .await
    }
}

/// Run `work` on the blocking pool of the current tokio runtime, or inline
/// when there is none. The calling task yields until `work` completes.
async fn offload<T, F>(primitive: Primitive, work: F) -> Result<T, PrimitiveError>
where
    F: FnOnce() -> Result<T, PrimitiveError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(work)
            .await
            .map_err(|e| PrimitiveError::failed(primitive, e.to_string()))?,
        Err(_) => work(),
    }
}
