//! Cart / order draft manager.
//!
//! This crate owns the shopping cart and order form as consistent in-memory
//! state. No other component mutates cart state; derived values (totals,
//! item counts) are recomputed on demand, never cached across mutations.

pub mod draft;
pub mod form;

pub use draft::{CartDraft, CartLine};
pub use form::{FormField, OrderForm, PaymentMethod};
