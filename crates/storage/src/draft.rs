//! Persisted draft wire format.
//!
//! This is the serialized shape an existing deployment reads back after the
//! payment redirect; field names and primitive types must stay exactly as
//! they are here.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// One frozen order line inside a persisted draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

/// The single logical "pending order" record.
///
/// `total_amount` is frozen from the cart lines at submission time;
/// `timestamp` is epoch milliseconds and drives the freshness window.
/// `session_id` is absent until the external payment session exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedDraft {
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub store_id: String,
    pub items: Vec<PersistedItem>,
    pub total_amount: f64,
    pub payment_method: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl PersistedDraft {
    /// Whether the draft is within the freshness window.
    ///
    /// Stale drafts are leftovers of abandoned checkouts and are treated as
    /// absent, never surfaced.
    pub fn is_fresh(&self, window: Duration) -> bool {
        let age_ms = Utc::now().timestamp_millis() - self.timestamp;
        age_ms <= window.num_milliseconds()
    }
}
