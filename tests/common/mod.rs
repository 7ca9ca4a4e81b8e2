//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::num::NonZeroU32;
use std::sync::OnceLock;

use async_trait::async_trait;
use presscrypt::{
    Engine, HashAlgorithm, KeyPair, Primitive, PrimitiveError, PrimitiveProvider, RingProvider,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

pub fn engine() -> Engine {
    Engine::with_defaults().unwrap()
}

/// RSA-4096 generation costs seconds, so each test binary makes at most two pairs.
pub fn alice() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| futures::executor::block_on(engine().generate_asymmetric_key_pair()).unwrap())
}

pub fn mallory() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| futures::executor::block_on(engine().generate_asymmetric_key_pair()).unwrap())
}

/// A provider that reports one primitive as missing and otherwise defers to ring.
pub struct MissingPrimitive {
    pub missing: Primitive,
    inner: RingProvider,
}

impl MissingPrimitive {
    pub fn new(missing: Primitive) -> Self {
        Self {
            missing,
            inner: RingProvider::new(),
        }
    }

    fn check(&self, primitive: Primitive) -> Result<(), PrimitiveError> {
        if primitive == self.missing {
            Err(PrimitiveError::Unavailable(primitive))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PrimitiveProvider for MissingPrimitive {
    fn name(&self) -> &'static str {
        "missing-primitive"
    }

    fn supports(&self, primitive: Primitive) -> bool {
        primitive != self.missing
    }

    async fn random_bytes(&self, len: usize) -> Result<Vec<u8>, PrimitiveError> {
        self.check(Primitive::SecureRandom)?;
        self.inner.random_bytes(len).await
    }

    async fn digest(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>, PrimitiveError> {
        self.inner.digest(algorithm, data).await
    }

    async fn aes_gcm_encrypt(
        &self,
        key: &[u8; 32],
        iv: &[u8; 12],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        self.check(Primitive::AesGcm)?;
        self.inner.aes_gcm_encrypt(key, iv, plaintext).await
    }

    async fn aes_gcm_decrypt(
        &self,
        key: &[u8; 32],
        iv: &[u8; 12],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError> {
        self.check(Primitive::AesGcm)?;
        self.inner.aes_gcm_decrypt(key, iv, ciphertext).await
    }

    async fn rsa_generate(&self, bits: usize, exponent: u32) -> Result<RsaPrivateKey, PrimitiveError> {
        self.check(Primitive::RsaOaep)?;
        self.inner.rsa_generate(bits, exponent).await
    }

    async fn rsa_oaep_encrypt(
        &self,
        key: &RsaPublicKey,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PrimitiveError> {
        self.check(Primitive::RsaOaep)?;
        self.inner.rsa_oaep_encrypt(key, plaintext).await
    }

    async fn rsa_oaep_decrypt(
        &self,
        key: &RsaPrivateKey,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, PrimitiveError> {
        self.check(Primitive::RsaOaep)?;
        self.inner.rsa_oaep_decrypt(key, ciphertext).await
    }

    async fn rsa_pss_sign(&self, key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, PrimitiveError> {
        self.check(Primitive::RsaPss)?;
        self.inner.rsa_pss_sign(key, data).await
    }

    async fn rsa_pss_verify(
        &self,
        key: &RsaPublicKey,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool, PrimitiveError> {
        self.check(Primitive::RsaPss)?;
        self.inner.rsa_pss_verify(key, data, signature).await
    }

    async fn pbkdf2_derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: NonZeroU32,
        hash: HashAlgorithm,
    ) -> Result<Zeroizing<[u8; 32]>, PrimitiveError> {
        self.check(Primitive::Pbkdf2)?;
        self.inner.pbkdf2_derive(password, salt, iterations, hash).await
    }
}
