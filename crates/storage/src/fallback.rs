//! The storage fallback layer: one logical record, three substrates.

use chrono::Duration;
use std::path::PathBuf;

use crate::draft::PersistedDraft;
use crate::substrate::{
    DraftSubstrate, FileBackupStore, FragmentStore, SessionStore, StorageError,
};

/// Storage configuration with deployment defaults.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// Key naming the record in the backup file and the fragment carrier.
    pub key: String,
    /// Explicit backup file path; `None` resolves under the OS data dir.
    pub backup_path: Option<PathBuf>,
    /// Ceiling on the encoded fragment length (URL-length safety).
    pub fragment_max_encoded_len: usize,
    /// Drafts older than this are treated as absent on load.
    pub freshness_window: Duration,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            key: "pending_order".into(),
            backup_path: None,
            fragment_max_encoded_len: 8 * 1024,
            freshness_window: Duration::hours(24),
        }
    }
}

/// Which substrates accepted a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub saved_to: Vec<&'static str>,
}

/// Makes a serialized draft survive the redirect to the hosted payment page.
///
/// Substrates are tried independently; one failing never blocks another.
/// Reads walk the same fixed priority order the constructor establishes:
/// session, backup, fragment.
pub struct FallbackStore {
    substrates: Vec<Box<dyn DraftSubstrate>>,
    freshness_window: Duration,
}

impl FallbackStore {
    pub fn new(settings: &StorageSettings) -> Self {
        let mut substrates: Vec<Box<dyn DraftSubstrate>> = Vec::with_capacity(3);
        substrates.push(Box::new(SessionStore::new()));

        let backup = match &settings.backup_path {
            Some(path) => Ok(FileBackupStore::with_path(path.clone())),
            None => FileBackupStore::new(&settings.key),
        };
        match backup {
            Ok(store) => substrates.push(Box::new(store)),
            // The host may simply not expose a data dir; the other
            // substrates still carry the draft.
            Err(err) => tracing::warn!(error = %err, "backup substrate unavailable"),
        }

        substrates.push(Box::new(FragmentStore::new(
            settings.key.clone(),
            settings.fragment_max_encoded_len,
        )));

        Self {
            substrates,
            freshness_window: settings.freshness_window,
        }
    }

    /// Build from explicit substrates, preserving their order as the read
    /// priority.
    pub fn with_substrates(
        substrates: Vec<Box<dyn DraftSubstrate>>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            substrates,
            freshness_window,
        }
    }

    /// Persist the draft to every substrate that will take it.
    ///
    /// Succeeds if at least one write lands. Calling again for the same
    /// order overwrites each copy (the second save carries the session id).
    pub fn save(&self, draft: &PersistedDraft) -> Result<SaveReceipt, StorageError> {
        let payload =
            serde_json::to_string(draft).map_err(|e| StorageError::Serialize(e.to_string()))?;

        let mut saved_to = Vec::new();
        for substrate in &self.substrates {
            match substrate.put(&payload) {
                Ok(()) => saved_to.push(substrate.name()),
                Err(err) => {
                    tracing::warn!(substrate = substrate.name(), error = %err, "draft save failed");
                }
            }
        }

        if saved_to.is_empty() {
            return Err(StorageError::AllSubstratesFailed);
        }

        tracing::info!(order_id = %draft.order_id, saved_to = ?saved_to, "draft persisted");
        Ok(SaveReceipt { saved_to })
    }

    /// Return the first structurally valid, fresh candidate in priority
    /// order. Partial data is never merged across sources.
    ///
    /// `None` is a legitimate outcome (user navigated here directly, or the
    /// draft expired), not a fault.
    pub fn load(&self) -> Option<PersistedDraft> {
        for substrate in &self.substrates {
            let payload = match substrate.get() {
                Ok(Some(payload)) => payload,
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(substrate = substrate.name(), error = %err, "draft read failed");
                    continue;
                }
            };

            let draft: PersistedDraft = match serde_json::from_str(&payload) {
                Ok(draft) => draft,
                Err(err) => {
                    tracing::debug!(substrate = substrate.name(), error = %err, "malformed draft skipped");
                    continue;
                }
            };

            if !draft.is_fresh(self.freshness_window) {
                tracing::debug!(
                    substrate = substrate.name(),
                    order_id = %draft.order_id,
                    "stale draft skipped"
                );
                continue;
            }

            tracing::info!(substrate = substrate.name(), order_id = %draft.order_id, "draft recovered");
            return Some(draft);
        }
        None
    }

    /// Best-effort removal from every substrate; never fails.
    ///
    /// Used after successful recovery and after terminal checkout errors; a
    /// stale draft must never claim success later.
    pub fn clear(&self) {
        for substrate in &self.substrates {
            if let Err(err) = substrate.remove() {
                tracing::warn!(substrate = substrate.name(), error = %err, "draft clear failed");
            }
        }
    }
}
