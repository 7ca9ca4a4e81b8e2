//! # presscrypt
//!
//! Client-side, zero-knowledge encryption for contributor content.
//!
//! Files, short messages and the user's own key material are encrypted on the
//! device before they leave it. The server only ever transports and stores
//! opaque bundles.
//!
//! ## Layers
//!
//! ```text
//! file / message / vault / audit      collaborator-facing operations
//!        hybrid  /  kdf               composition
//!   symmetric / asymmetric            single primitives behind a KeyHandle
//!            provider                 ring + rsa, swappable
//! ```
//!
//! Everything is reached through an [`Engine`] value: construct one with a
//! [`PrimitiveProvider`] and an [`EngineConfig`], then call its async methods.
//! The engine keeps no state between calls.
//!
//! ```no_run
//! # async fn demo() -> presscrypt::Result<()> {
//! use presscrypt::{Engine, FileMeta};
//!
//! let engine = Engine::with_defaults()?;
//! let sealed = engine
//!     .encrypt_file(b"draft", &FileMeta::new("draft.txt", "text/plain"), "Sup3rSecret!")
//!     .await?;
//! let opened = engine.decrypt_file_verified(&sealed, "Sup3rSecret!").await?;
//! assert_eq!(opened.content.as_slice(), b"draft");
//! # Ok(())
//! # }
//! ```

pub mod algorithm;
pub mod asymmetric;
pub mod audit;
pub mod config;
pub(crate) mod encoding;
pub mod engine;
pub mod error;
pub mod file;
pub mod fingerprint;
pub mod hybrid;
pub mod kdf;
pub mod keys;
pub mod message;
pub mod provider;
pub mod symmetric;
pub mod vault;

pub use algorithm::{AsymmetricAlgorithm, HashAlgorithm, HybridAlgorithm, SymmetricAlgorithm};
pub use audit::{AuditLog, AuditRecord, AuditSink, FileAuditSink};
pub use config::{EngineConfig, KdfConfig};
pub use engine::Engine;
pub use error::{CryptoError, Result};
pub use file::{DecryptedFile, EncryptedFile, FileMeta, FileMetadata};
pub use fingerprint::FileFingerprint;
pub use hybrid::HybridBundle;
pub use kdf::DerivedKey;
pub use keys::{KeyHandle, KeyPair, KeyRole};
pub use message::EncryptedMessage;
pub use provider::{Primitive, PrimitiveError, PrimitiveProvider, RingProvider};
pub use symmetric::EncryptedBlob;
pub use vault::{KeyStore, KeyVault, KeyVaultEntry, MemoryKeyStore};
