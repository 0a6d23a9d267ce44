//! Store settings
//!
//! Consumed by the presentation layer (currency symbol, receipt text);
//! engine computations never read these.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    pub store_name: String,
    pub currency_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_footer: Option<String>,
    /// Default kitchen estimate offered by the UI, minutes.
    pub default_preparation_minutes: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Tillpoint".to_string(),
            currency_symbol: "€".to_string(),
            receipt_header: None,
            receipt_footer: None,
            default_preparation_minutes: 15,
        }
    }
}
