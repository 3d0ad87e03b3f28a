//! Payment processor seam.
//!
//! The orchestrator only ever talks to the `PaymentGateway` trait; the
//! concrete client is injected at construction, never a module-level
//! handle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ordena_core::StoreId;
use ordena_storage::PersistedItem;

use crate::error::{PaymentError, PaymentErrorCode};
use crate::locale::Locale;

/// Customer contact subset forwarded to the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Inputs for external payment-session creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRequest {
    pub items: Vec<PersistedItem>,
    pub customer: CustomerInfo,
    pub store_id: StoreId,
    pub currency: String,
    pub locale: Locale,
}

/// The only field of the processor's response the core needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentSession {
    pub id: String,
}

/// Where the shell must navigate to complete payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted payment session.
    async fn create_session(&self, request: &SessionRequest)
        -> Result<PaymentSession, PaymentError>;

    /// Resolve the navigation hand-off for a session.
    ///
    /// Failures here are synchronous SDK errors and are treated exactly
    /// like a failed session request.
    fn redirect_to_session(&self, session_id: &str) -> Result<RedirectTarget, PaymentError>;
}

/// HTTP-backed gateway client.
pub struct HttpPaymentGateway {
    api_url: String,
    hosted_page_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(api_url: impl Into<String>, hosted_page_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            hosted_page_url: hosted_page_url.into(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<PaymentSession, PaymentError> {
        let url = format!("{}/checkout/sessions", self.api_url);
        let mut req = self.client.post(&url).json(request);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PaymentError::transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PaymentError::status(status.as_u16(), body));
        }

        resp.json::<PaymentSession>()
            .await
            .map_err(|e| PaymentError::transport(format!("session decode failed: {e}")))
    }

    fn redirect_to_session(&self, session_id: &str) -> Result<RedirectTarget, PaymentError> {
        if session_id.is_empty() {
            return Err(PaymentError::new(
                PaymentErrorCode::RedirectFailed,
                "empty session id",
            ));
        }
        Ok(RedirectTarget {
            url: format!("{}/{session_id}", self.hosted_page_url),
        })
    }
}
