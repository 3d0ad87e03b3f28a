use serde::{Deserialize, Serialize};

use ordena_catalog::CatalogItem;
use ordena_core::{DomainError, DomainResult, ItemId};

use crate::form::{FormField, OrderForm};

/// One cart line: a catalog item selection with a positive quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub name: String,
    /// Unit price captured at add-to-cart time.
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// In-memory order draft: line items plus the customer order form.
///
/// Lines are mutable while the draft is in the cart state and are frozen by
/// the checkout orchestrator at submission time. A quantity never reaches
/// zero; the line is removed instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartDraft {
    lines: Vec<CartLine>,
    form: OrderForm,
    general_error: Option<String>,
}

impl CartDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn form(&self) -> &OrderForm {
        &self.form
    }

    /// Add one unit of a catalog item.
    ///
    /// Rejects unavailable items, leaving the cart untouched. An existing
    /// line for the same id is incremented; otherwise a new line is appended
    /// with quantity 1. The input item is never mutated.
    pub fn add_item(&mut self, item: &CatalogItem) -> DomainResult<()> {
        if !item.can_be_ordered() {
            return Err(DomainError::validation(format!(
                "item {} is not available",
                item.id
            )));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                item_id: item.id.clone(),
                name: item.name.clone(),
                unit_price: item.price,
                quantity: 1,
            });
        }
        Ok(())
    }

    /// Remove one unit; the line disappears once its quantity reaches zero.
    /// Removing an id that is not in the cart is a no-op.
    pub fn remove_item(&mut self, item_id: &ItemId) {
        if let Some(pos) = self.lines.iter().position(|l| &l.item_id == item_id) {
            if self.lines[pos].quantity > 1 {
                self.lines[pos].quantity -= 1;
            } else {
                self.lines.remove(pos);
            }
        }
    }

    /// Set a line's quantity directly; zero removes the line.
    pub fn update_quantity(&mut self, item_id: &ItemId, quantity: u32) {
        if quantity == 0 {
            self.lines.retain(|l| &l.item_id != item_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.item_id == item_id) {
            line.quantity = quantity;
        }
    }

    /// Empty all lines unconditionally.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Merge a single form field; typing also dismisses the general error
    /// banner, since editing implies the user is addressing it.
    pub fn set_form_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set_field(field, value);
        self.general_error = None;
    }

    pub fn set_payment_method(&mut self, method: crate::form::PaymentMethod) {
        self.form.payment_method = method;
    }

    pub fn set_general_error(&mut self, message: impl Into<String>) {
        self.general_error = Some(message.into());
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    /// Σ(unit_price × quantity) over all lines.
    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total units across all lines.
    pub fn total_item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Reset the whole draft (lines, form, error) for a new order.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
