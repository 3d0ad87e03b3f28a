//! Checkout error taxonomy.
//!
//! Failure values are explicit in signatures; the orchestrator converts
//! each into one user-facing string plus a structured diagnostic record at
//! its boundary, and nothing propagates further to crash a caller.

use thiserror::Error;

use ordena_storage::StorageError;

use crate::locale::Locale;
use crate::validate::ValidationError;

/// External payment-dependency failure.
///
/// Never retried automatically within a single submission; always paired
/// with clearing the persisted draft so a failed session cannot resurface
/// as pending.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payment failed ({code}): {message}")]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Transport, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Status(status), message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentErrorCode {
    /// The session request did not settle within the configured window.
    Timeout,
    /// Network-level failure reaching the processor.
    Transport,
    /// Non-success HTTP status from the processor.
    Status(u16),
    /// The processor answered without a usable session id.
    MissingSessionId,
    /// The redirect hand-off reported a synchronous error.
    RedirectFailed,
}

impl core::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PaymentErrorCode::Timeout => f.write_str("timeout"),
            PaymentErrorCode::Transport => f.write_str("transport"),
            PaymentErrorCode::Status(code) => write!(f, "status_{code}"),
            PaymentErrorCode::MissingSessionId => f.write_str("missing_session_id"),
            PaymentErrorCode::RedirectFailed => f.write_str("redirect_failed"),
        }
    }
}

/// Everything `submit` can fail with.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Every storage substrate refused the draft; checkout cannot proceed
    /// into a redirect it could not recover from.
    #[error("draft persistence failed: {0}")]
    Storage(#[from] StorageError),

    /// The caller tore down the checkout view; reported distinctly so it
    /// can be ignored silently.
    #[error("checkout cancelled")]
    Cancelled,
}

impl CheckoutError {
    /// The single localized string a UI surfaces for this failure.
    pub fn user_message(&self, locale: Locale) -> String {
        match self {
            CheckoutError::Validation(err) => err.first_message().to_string(),
            CheckoutError::Payment(err) => match err.code {
                PaymentErrorCode::Timeout => locale.payment_timed_out().to_string(),
                _ => locale.payment_failed().to_string(),
            },
            CheckoutError::Storage(_) => locale.order_save_failed().to_string(),
            CheckoutError::Cancelled => String::new(),
        }
    }
}
