//! The engine value.
//!
//! An [`Engine`] bundles a primitive provider with a validated configuration.
//! It holds no mutable state: every operation allocates its own IV, salt and
//! ephemeral key, so any number of calls may be in flight at once. Cloning is
//! cheap and clones share the same provider.
//!
//! The operations themselves live next to the data they produce
//! (`symmetric`, `kdf`, `asymmetric`, `hybrid`, `fingerprint`, `file`,
//! `vault`, `message`, `audit`), each as an `impl Engine` block.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::algorithm::HashAlgorithm;
use crate::config::EngineConfig;
use crate::error::{CryptoError, Result};
use crate::provider::{Primitive, PrimitiveError, PrimitiveProvider, RingProvider};

/// Digest of `"abc"` under SHA-256 (FIPS 180-2, appendix B.1).
const SHA256_ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

/// A client-side encryption engine bound to one provider.
pub struct Engine<P: PrimitiveProvider = RingProvider> {
    provider: Arc<P>,
    config: Arc<EngineConfig>,
}

impl<P: PrimitiveProvider> Clone for Engine<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: Arc::clone(&self.config),
        }
    }
}

impl<P: PrimitiveProvider> std::fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Engine<RingProvider> {
    /// An engine over [`RingProvider`] with the default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(RingProvider::new(), EngineConfig::default())
    }
}

impl<P: PrimitiveProvider> Engine<P> {
    /// Validate `config` and probe `provider` for every required primitive.
    ///
    /// A missing primitive is fatal and reported here rather than on first use.
    pub fn new(provider: P, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        if let Some(missing) = Primitive::REQUIRED
            .into_iter()
            .find(|p| !provider.supports(*p))
        {
            warn!(provider = provider.name(), primitive = %missing, "required primitive unavailable");
            return Err(CryptoError::PrimitiveUnavailable(missing));
        }

        info!(
            provider = provider.name(),
            symmetric = %config.symmetric,
            asymmetric = %config.asymmetric,
            iterations = config.kdf.iterations,
            "encryption engine ready"
        );

        Ok(Self {
            provider: Arc::new(provider),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Round-trip sanity check of the provider.
    ///
    /// Covers random generation, a SHA-256 known answer, PBKDF2 determinism,
    /// AES-GCM round trip and tamper rejection. RSA key generation is too slow
    /// to run on every start-up and is not exercised.
    pub async fn self_test(&self) -> bool {
        let outcome = self.run_self_test().await;
        match &outcome {
            Ok(()) => info!("self-test passed"),
            Err(e) => warn!(error = %e, "self-test failed"),
        }
        outcome.is_ok()
    }

    async fn run_self_test(&self) -> Result<()> {
        let digest = self.hash(HashAlgorithm::Sha256, b"abc").await?;
        if hex::encode(digest) != SHA256_ABC {
            return Err(CryptoError::IntegrityMismatch);
        }

        let probe = self.random_bytes(32).await?;
        let key = self.generate_symmetric_key().await?;
        let blob = self.encrypt(&probe, &key).await?;
        if self.decrypt(&blob, &key).await?.as_slice() != probe.as_slice() {
            return Err(CryptoError::DecryptionFailure);
        }

        let mut tampered = blob.clone();
        tampered.ciphertext[0] ^= 0x01;
        if self.decrypt(&tampered, &key).await.is_ok() {
            return Err(CryptoError::DecryptionFailure);
        }

        let first = self.derive_key_from_password("self-test", Some(&probe[..16])).await?;
        let second = self.derive_key_from_password("self-test", Some(&probe[..16])).await?;
        let sealed = self.encrypt(&probe, &first.key).await?;
        if self.decrypt(&sealed, &second.key).await?.as_slice() != probe.as_slice() {
            return Err(CryptoError::KeyDerivationFailure);
        }

        Ok(())
    }

    /// Cryptographically secure random bytes from the provider.
    pub async fn random_bytes(&self, len: usize) -> Result<Vec<u8>> {
        self.provider
            .random_bytes(len)
            .await
            .map_err(wrap(CryptoError::EncryptionFailure))
    }

    /// Raw digest of `data`.
    pub async fn hash(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>> {
        self.provider
            .digest(algorithm, data)
            .await
            .map_err(wrap(CryptoError::EncryptionFailure))
    }

    /// Lowercase hex digest of `data`.
    pub async fn hash_hex(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<String> {
        Ok(hex::encode(self.hash(algorithm, data).await?))
    }
}

/// Map a raw provider error into the category the caller is reporting.
///
/// Unavailable primitives always surface as such; everything else collapses
/// into `category`. Detail is logged at debug level only.
pub(crate) fn wrap(category: CryptoError) -> impl FnOnce(PrimitiveError) -> CryptoError {
    move |err| {
        debug!(primitive = %err.primitive(), "primitive operation failed");
        match err {
            PrimitiveError::Unavailable(p) => CryptoError::PrimitiveUnavailable(p),
            PrimitiveError::Failed { .. } => category,
        }
    }
}
