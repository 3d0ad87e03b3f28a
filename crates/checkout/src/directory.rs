//! Store/merchant metadata lookup.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ordena_core::StoreId;

use crate::locale::Locale;

/// Merchant metadata the notification needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub id: StoreId,
    pub name: String,
    /// Merchant-side notification recipient, when the store opted in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_phone: Option<String>,
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("store {0} not found")]
    NotFound(StoreId),

    #[error("store lookup failed: {0}")]
    Lookup(String),
}

#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn resolve(&self, store_id: &StoreId) -> Result<StoreProfile, DirectoryError>;
}

/// Map-backed directory for tests and embedded deployments.
#[derive(Debug, Default)]
pub struct InMemoryStoreDirectory {
    stores: Mutex<HashMap<StoreId, StoreProfile>>,
}

impl InMemoryStoreDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: StoreProfile) {
        if let Ok(mut stores) = self.stores.lock() {
            stores.insert(profile.id.clone(), profile);
        }
    }
}

#[async_trait]
impl StoreDirectory for InMemoryStoreDirectory {
    async fn resolve(&self, store_id: &StoreId) -> Result<StoreProfile, DirectoryError> {
        let stores = self
            .stores
            .lock()
            .map_err(|e| DirectoryError::Lookup(e.to_string()))?;
        stores
            .get(store_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(store_id.clone()))
    }
}
