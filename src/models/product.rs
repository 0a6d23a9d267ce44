//! Catalog product model

use serde::{Deserialize, Serialize};

/// A catalog product as supplied by the catalog provider.
///
/// Read-only from the engine's point of view: order lines embed a snapshot
/// of the product at the time of adding, so later catalog edits never
/// retroactively change an existing line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Localized display name, when the store runs a second language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    /// Free-text category label.
    pub category: String,
    /// Sale price in currency units. Non-negative.
    pub price: f64,
    /// Cost in currency units. Non-negative; price >= cost is not enforced.
    pub cost: f64,
    pub is_available: bool,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            localized_name: None,
            category: String::new(),
            price,
            cost: 0.0,
            is_available: true,
        }
    }
}
