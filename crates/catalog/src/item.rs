use serde::{Deserialize, Serialize};

use ordena_core::ItemId;

/// Sentinel category that selects the whole menu.
pub const ALL_CATEGORIES: &str = "All";

/// A menu item as served by the merchant backend.
///
/// Prices are plain JSON numbers end-to-end; the persisted draft format
/// types `price`/`total_amount` the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub price: f64,
    pub available: bool,
}

impl CatalogItem {
    /// Check if the item can be added to a cart (must be available).
    pub fn can_be_ordered(&self) -> bool {
        self.available
    }
}

/// Derive the category list for the menu filter bar.
///
/// Always starts with the `"All"` sentinel; the rest follow in stable
/// first-appearance order so the filter bar does not reshuffle as items
/// load. Uncategorized items contribute nothing.
pub fn available_categories(items: &[CatalogItem]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for item in items {
        if let Some(category) = &item.category {
            if !categories.iter().any(|c| c == category) {
                categories.push(category.clone());
            }
        }
    }
    categories
}

/// Filter the menu by a selected category; the sentinel selects everything.
pub fn filter_by_category<'a>(items: &'a [CatalogItem], category: &str) -> Vec<&'a CatalogItem> {
    if category == ALL_CATEGORIES {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item.category.as_deref() == Some(category))
        .collect()
}
