//! Engine configuration.
//!
//! A strongly typed record validated once, when the engine is constructed.
//! Collaborators may load it from JSON; unknown fields are rejected so a typo
//! never silently falls back to a default.

use serde::{Deserialize, Serialize};

use crate::algorithm::{AsymmetricAlgorithm, SymmetricAlgorithm};
use crate::error::{CryptoError, Result};

/// Lowest PBKDF2 iteration count accepted for newly derived keys.
///
/// May be raised over time, never lowered. Entries written under an older
/// count stay readable because each one records its own count.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Default ceiling on iteration counts read back from stored records.
///
/// Stored counts come from storage the engine does not trust; anything above
/// this is refused instead of derived.
pub const DEFAULT_MAX_PBKDF2_ITERATIONS: u32 = 10 * MIN_PBKDF2_ITERATIONS;

/// Default salt length for password derivation, in bytes.
pub const DEFAULT_SALT_LEN: usize = 16;

/// Default namespace prefixed to vault identifiers in the collaborator's store.
pub const DEFAULT_VAULT_NAMESPACE: &str = "presscrypt_key";

/// PBKDF2 parameters used for newly derived keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KdfConfig {
    pub iterations: u32,
    /// Highest count accepted when re-deriving a key for a stored record.
    pub max_iterations: u32,
    pub salt_len: usize,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            iterations: MIN_PBKDF2_ITERATIONS,
            max_iterations: DEFAULT_MAX_PBKDF2_ITERATIONS,
            salt_len: DEFAULT_SALT_LEN,
        }
    }
}

/// Everything an [`Engine`](crate::Engine) needs besides its provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub symmetric: SymmetricAlgorithm,
    pub asymmetric: AsymmetricAlgorithm,
    pub kdf: KdfConfig,
    pub vault_namespace: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symmetric: SymmetricAlgorithm::default(),
            asymmetric: AsymmetricAlgorithm::default(),
            kdf: KdfConfig::default(),
            vault_namespace: DEFAULT_VAULT_NAMESPACE.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CryptoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameters the engine refuses to run with.
    pub fn validate(&self) -> Result<()> {
        if self.kdf.iterations < MIN_PBKDF2_ITERATIONS {
            return Err(CryptoError::InvalidConfig(format!(
                "kdf.iterations must be at least {}",
                MIN_PBKDF2_ITERATIONS
            )));
        }
        if self.kdf.max_iterations < self.kdf.iterations {
            return Err(CryptoError::InvalidConfig(
                "kdf.max_iterations must not be below kdf.iterations".to_string(),
            ));
        }
        if self.kdf.salt_len < DEFAULT_SALT_LEN {
            return Err(CryptoError::InvalidConfig(format!(
                "kdf.salt_len must be at least {} bytes",
                DEFAULT_SALT_LEN
            )));
        }
        if self.vault_namespace.trim().is_empty() {
            return Err(CryptoError::InvalidConfig(
                "vault_namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
