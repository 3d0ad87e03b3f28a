//! Menu catalog read model.
//!
//! Catalog items are owned by the merchant backend; this crate only models
//! the shape the storefront consumes (availability, pricing, categories).

pub mod item;

pub use item::{available_categories, filter_by_category, CatalogItem, ALL_CATEGORIES};
