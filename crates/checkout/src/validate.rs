//! Pre-submission validation.
//!
//! Cart-level checks short-circuit; form-field checks are all evaluated so
//! the UI can annotate every offending input at once.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use ordena_cart::{CartDraft, FormField};
use ordena_catalog::CatalogItem;
use ordena_core::ItemId;

use crate::locale::Locale;
use crate::phone::is_valid_phone;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Field-scoped validation failures, one message per offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<FormField, String>,
}

impl FieldErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message driving the generic error banner.
    pub fn first_message(&self) -> &str {
        self.errors
            .values()
            .next()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

// Display shows the banner message; the map is for per-field annotation.
impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.first_message())
    }
}

/// Why a submission was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{message}")]
    EmptyCart { message: String },

    /// Items going unavailable between add-to-cart and checkout is an
    /// expected case; the whole draft is invalidated, never a partial order.
    #[error("{message}")]
    UnavailableItems { items: Vec<ItemId>, message: String },

    #[error("{0}")]
    Fields(FieldErrors),
}

impl ValidationError {
    /// The message for the generic error banner.
    pub fn first_message(&self) -> &str {
        match self {
            ValidationError::EmptyCart { message } => message,
            ValidationError::UnavailableItems { message, .. } => message,
            ValidationError::Fields(errors) => errors.first_message(),
        }
    }

    /// The field the first error is scoped to, when it is field-scoped.
    pub fn first_field(&self) -> Option<FormField> {
        match self {
            ValidationError::Fields(errors) => errors.fields().next().map(|(f, _)| f),
            _ => None,
        }
    }
}

/// Gatekeep checkout submission.
///
/// Runs the cart checks first, short-circuiting on the first cart-level
/// failure; field checks are then all evaluated independently.
pub fn validate(
    cart: &CartDraft,
    catalog: &[CatalogItem],
    locale: Locale,
) -> Result<(), ValidationError> {
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart {
            message: locale.empty_cart().to_string(),
        });
    }

    let unavailable: Vec<ItemId> = cart
        .lines()
        .iter()
        .filter(|line| {
            !catalog
                .iter()
                .any(|item| item.id == line.item_id && item.can_be_ordered())
        })
        .map(|line| line.item_id.clone())
        .collect();
    if !unavailable.is_empty() {
        return Err(ValidationError::UnavailableItems {
            items: unavailable,
            message: locale.unavailable_items().to_string(),
        });
    }

    let form = cart.form();
    let mut errors = BTreeMap::new();

    if form.customer_name.trim().is_empty() {
        errors.insert(FormField::CustomerName, locale.name_required().to_string());
    }
    if !is_valid_phone(&form.customer_phone) {
        errors.insert(FormField::CustomerPhone, locale.phone_invalid().to_string());
    }
    if form.delivery_address.trim().is_empty() {
        errors.insert(
            FormField::DeliveryAddress,
            locale.address_required().to_string(),
        );
    }
    if let Some(email) = form.email() {
        if !EMAIL_RE.is_match(email) {
            errors.insert(FormField::CustomerEmail, locale.email_invalid().to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Fields(FieldErrors { errors }))
    }
}
