//! Individual storage substrates.
//!
//! Each substrate is a single-slot store for the serialized pending-order
//! record. Substrates fail independently; the fallback layer decides what a
//! failure means.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

/// Substrate-level storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage substrate '{substrate}' unavailable: {reason}")]
    Unavailable {
        substrate: &'static str,
        reason: String,
    },

    #[error("payload exceeds fragment capacity ({len} > {max} bytes)")]
    CapacityExceeded { len: usize, max: usize },

    #[error("draft serialization failed: {0}")]
    Serialize(String),

    #[error("all storage substrates failed")]
    AllSubstratesFailed,
}

/// A single-slot store for the serialized pending-order payload.
pub trait DraftSubstrate: Send + Sync {
    /// Stable substrate name, used in save receipts and diagnostics.
    fn name(&self) -> &'static str;

    /// Write the payload, overwriting any previous value.
    fn put(&self, payload: &str) -> Result<(), StorageError>;

    /// Read the payload back, `None` if the slot is empty.
    fn get(&self) -> Result<Option<String>, StorageError>;

    /// Remove the payload; removing an empty slot succeeds.
    fn remove(&self) -> Result<(), StorageError>;
}

/// Short-lived session-scoped slot (tab-session analog).
///
/// Lives for the process lifetime only; first in the read priority order.
#[derive(Debug, Default)]
pub struct SessionStore {
    slot: Mutex<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftSubstrate for SessionStore {
    fn name(&self) -> &'static str {
        "session"
    }

    fn put(&self, payload: &str) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|e| StorageError::Unavailable {
            substrate: self.name(),
            reason: e.to_string(),
        })?;
        *slot = Some(payload.to_string());
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StorageError> {
        let slot = self.slot.lock().map_err(|e| StorageError::Unavailable {
            substrate: self.name(),
            reason: e.to_string(),
        })?;
        Ok(slot.clone())
    }

    fn remove(&self) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|e| StorageError::Unavailable {
            substrate: self.name(),
            reason: e.to_string(),
        })?;
        *slot = None;
        Ok(())
    }
}

/// Longer-lived backup slot persisted as a JSON file under the OS data dir.
#[derive(Debug)]
pub struct FileBackupStore {
    path: PathBuf,
}

impl FileBackupStore {
    /// Store under `{data_dir}/ordena/{key}.json`.
    pub fn new(key: &str) -> Result<Self, StorageError> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .ok_or_else(|| StorageError::Unavailable {
                substrate: "backup",
                reason: "no OS data directory available".into(),
            })?;

        let mut path = base;
        path.push("ordena");
        path.push(format!("{key}.json"));
        Ok(Self { path })
    }

    /// Store at an explicit path (tests, embedded hosts).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn io_err(&self, e: std::io::Error) -> StorageError {
        StorageError::Unavailable {
            substrate: self.name(),
            reason: e.to_string(),
        }
    }
}

impl DraftSubstrate for FileBackupStore {
    fn name(&self) -> &'static str {
        "backup"
    }

    fn put(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        std::fs::write(&self.path, payload).map_err(|e| self.io_err(e))
    }

    fn get(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// URL-fragment carrier: a base64 payload in a shared, externally visible
/// slot the host shell mirrors into the page fragment.
///
/// Writes are refused above the encoded-length ceiling; an oversized
/// fragment would be truncated by intermediaries rather than rejected.
#[derive(Debug)]
pub struct FragmentStore {
    key: String,
    slot: Arc<Mutex<Option<String>>>,
    max_encoded_len: usize,
}

impl FragmentStore {
    pub fn new(key: impl Into<String>, max_encoded_len: usize) -> Self {
        Self {
            key: key.into(),
            slot: Arc::new(Mutex::new(None)),
            max_encoded_len,
        }
    }

    /// Share an existing slot (the host shell owns the real fragment).
    pub fn with_slot(
        key: impl Into<String>,
        slot: Arc<Mutex<Option<String>>>,
        max_encoded_len: usize,
    ) -> Self {
        Self {
            key: key.into(),
            slot,
            max_encoded_len,
        }
    }

    /// Handle to the underlying slot, for the host shell to mirror.
    pub fn slot(&self) -> Arc<Mutex<Option<String>>> {
        Arc::clone(&self.slot)
    }

    fn lock_err(&self, reason: String) -> StorageError {
        StorageError::Unavailable {
            substrate: self.name(),
            reason,
        }
    }
}

impl DraftSubstrate for FragmentStore {
    fn name(&self) -> &'static str {
        "fragment"
    }

    fn put(&self, payload: &str) -> Result<(), StorageError> {
        let encoded = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let fragment = format!("{}={}", self.key, encoded);
        if fragment.len() > self.max_encoded_len {
            return Err(StorageError::CapacityExceeded {
                len: fragment.len(),
                max: self.max_encoded_len,
            });
        }

        let mut slot = self.slot.lock().map_err(|e| self.lock_err(e.to_string()))?;
        *slot = Some(fragment);
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StorageError> {
        let slot = self.slot.lock().map_err(|e| self.lock_err(e.to_string()))?;
        let Some(fragment) = slot.as_deref() else {
            return Ok(None);
        };
        let Some(encoded) = fragment.strip_prefix(&format!("{}=", self.key)) else {
            // Fragment belongs to something else; not ours to interpret.
            return Ok(None);
        };
        let bytes = self
            .decode(encoded)
            .map_err(|e| self.lock_err(format!("fragment decode failed: {e}")))?;
        Ok(Some(bytes))
    }

    fn remove(&self) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|e| self.lock_err(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

impl FragmentStore {
    fn decode(&self, encoded: &str) -> Result<String, String> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .map_err(|e| e.to_string())?;
        String::from_utf8(bytes).map_err(|e| e.to_string())
    }
}
