//! Tamper-evident audit entries.
//!
//! Each record carries a `signature`: the hex SHA-256 of its own canonical
//! JSON with the signature field left out. Editing any field after the fact
//! breaks the signature. The log is append-only, owned by the collaborator,
//! and can forward records to pluggable sinks.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::HashAlgorithm;
use crate::engine::Engine;
use crate::error::{CryptoError, Result};
use crate::provider::PrimitiveProvider;

/// A sink that receives audit records. Implement this to forward records
/// to a file, database, or other persistent store.
pub trait AuditSink: Send {
    fn append(&mut self, record: AuditRecord);
}

/// A signed record of one security-relevant action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub user_id: String,
    pub resource_id: String,
    pub metadata: BTreeMap<String, String>,
    pub signature: String,
}

/// The signed portion of a record. Field order and the sorted map make the
/// encoding canonical.
#[derive(Serialize)]
struct Unsigned<'a> {
    action: &'a str,
    metadata: &'a BTreeMap<String, String>,
    resource_id: &'a str,
    timestamp: &'a DateTime<Utc>,
    user_id: &'a str,
}

impl AuditRecord {
    fn canonical_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&Unsigned {
            action: &self.action,
            metadata: &self.metadata,
            resource_id: &self.resource_id,
            timestamp: &self.timestamp,
            user_id: &self.user_id,
        })
        .map_err(|_| CryptoError::EncryptionFailure)
    }
}

impl<P: PrimitiveProvider> Engine<P> {
    /// Build and sign an audit record.
    pub async fn audit_entry(
        &self,
        action: &str,
        user_id: &str,
        resource_id: &str,
        metadata: BTreeMap<String, String>,
    ) -> Result<AuditRecord> {
        let mut record = AuditRecord {
            timestamp: Utc::now(),
            action: action.to_string(),
            user_id: user_id.to_string(),
            resource_id: resource_id.to_string(),
            metadata,
            signature: String::new(),
        };
        let canonical = record.canonical_bytes()?;
        record.signature = self.hash_hex(HashAlgorithm::Sha256, &canonical).await?;
        Ok(record)
    }

    /// Whether `record` is unchanged since it was signed.
    pub async fn verify_audit_entry(&self, record: &AuditRecord) -> Result<bool> {
        let canonical = record.canonical_bytes()?;
        let expected = self.hash_hex(HashAlgorithm::Sha256, &canonical).await?;
        Ok(expected == record.signature)
    }
}

/// An append-only log of audit records.
/// Can forward records to additional sinks via `add_forward_sink`.
#[derive(Default, Serialize, Deserialize)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
    #[serde(skip)]
    forward_sinks: Vec<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("records", &self.records)
            .field("forward_sinks", &self.forward_sinks.len())
            .finish()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_forward_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.forward_sinks.push(sink);
    }

    /// Append a record and forward it to every attached sink.
    pub fn append(&mut self, record: AuditRecord) {
        for sink in self.forward_sinks.iter_mut() {
            sink.append(record.clone());
        }
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuditRecord> {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Built-in sink: file
// ---------------------------------------------------------------------------

/// Writes audit records as JSON lines (one per record) to a file.
/// Creates the file if it doesn't exist; appends if it does.
pub struct FileAuditSink {
    file: std::fs::File,
}

impl FileAuditSink {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl AuditSink for FileAuditSink {
    fn append(&mut self, record: AuditRecord) {
        match serde_json::to_string(&record) {
            Ok(line) => {
                if let Err(e) = writeln!(self.file, "{line}").and_then(|_| self.file.flush()) {
                    tracing::warn!(error = %e, "failed to write audit record");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize audit record"),
        }
    }
}
