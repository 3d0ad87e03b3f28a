//! Order notification seam (business messaging API).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ordena_storage::PersistedDraft;

use crate::directory::StoreProfile;

/// Post-payment notification failure.
///
/// Non-fatal to the order: the payment already completed, so this is
/// reported distinctly and retried manually, never rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("messaging API returned status {0}")]
    Status(u16),

    #[error("messaging API rejected the notification: {0}")]
    Rejected(String),
}

/// Lifecycle of the one-shot notification side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Error,
}

/// What the messaging side effect receives: the recovered order (phone
/// already normalized to international format) plus the resolved store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub order: PersistedDraft,
    pub store: StoreProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationReceipt {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Dispatch the order confirmation. Called at most once per recovered
    /// order by the recovery stage.
    async fn send_order_notification(
        &self,
        payload: &NotificationPayload,
    ) -> Result<NotificationReceipt, NotificationError>;
}

/// Messaging API wire response (`messageId` is camelCase on the wire).
#[derive(Debug, Deserialize)]
struct NotificationResponse {
    success: bool,
    #[serde(default, rename = "messageId")]
    message_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP-backed messaging client.
///
/// Posts the customer message, and a second merchant-side message when the
/// store profile carries a notification phone.
pub struct HttpOrderNotifier {
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpOrderNotifier {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn post_message(
        &self,
        recipient: &str,
        payload: &NotificationPayload,
    ) -> Result<NotificationReceipt, NotificationError> {
        let url = format!("{}/messages", self.api_url);
        let body = serde_json::json!({
            "to": recipient,
            "order": payload.order,
            "store_name": payload.store.name,
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotificationError::Status(status.as_u16()));
        }

        let decoded: NotificationResponse = resp
            .json()
            .await
            .map_err(|e| NotificationError::Transport(format!("response decode failed: {e}")))?;

        if !decoded.success {
            return Err(NotificationError::Rejected(
                decoded.error.unwrap_or_else(|| "unspecified".into()),
            ));
        }

        Ok(NotificationReceipt {
            message_id: decoded.message_id,
        })
    }
}

#[async_trait]
impl OrderNotifier for HttpOrderNotifier {
    async fn send_order_notification(
        &self,
        payload: &NotificationPayload,
    ) -> Result<NotificationReceipt, NotificationError> {
        let receipt = self
            .post_message(&payload.order.customer_phone, payload)
            .await?;

        // Merchant copy is secondary: a failure here is logged, not
        // surfaced, once the customer message went out.
        if let Some(merchant_phone) = &payload.store.notification_phone {
            if let Err(err) = self.post_message(merchant_phone, payload).await {
                tracing::warn!(
                    order_id = %payload.order.order_id,
                    error = %err,
                    "merchant notification failed"
                );
            }
        }

        Ok(receipt)
    }
}
