//! Checkout configuration.
//!
//! A single settings object with deployment defaults; nothing here reads
//! the environment.

use std::time::Duration;

use crate::locale::Locale;

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Ceiling on the external payment-session request.
    pub session_timeout: Duration,
    /// Locale for user-facing copy.
    pub locale: Locale,
    /// ISO currency code passed to the payment processor.
    pub currency: String,
    /// Country code prefixed to phone numbers entered without one.
    pub default_country_code: Option<String>,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(15),
            locale: Locale::default(),
            currency: "MXN".into(),
            default_country_code: None,
        }
    }
}
