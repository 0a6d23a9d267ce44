//! Order-level discount model
//!
//! A discount is a tagged union with exactly one variant attached to an
//! order at a time; applying a new one replaces the old. Input ranges are
//! validated when the discount is attached, and the computed amount is
//! additionally clamped at calculation time so the final amount can never
//! go negative.

use crate::error::{OrderError, OrderResult};
use serde::{Deserialize, Serialize};

/// Discount attached to an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Discount {
    /// Absolute amount off the order subtotal.
    Fixed { value: f64 },
    /// Percentage off the order subtotal, 0..=100.
    Percentage { value: f64 },
    /// Buy N units, get M units free. When `applicable_product_ids` is
    /// present only those products qualify (evaluated per product group);
    /// otherwise all items qualify and free units are granted against the
    /// cheapest eligible units first.
    BuyXGetY {
        buy_count: u32,
        get_free_count: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        applicable_product_ids: Option<Vec<String>>,
    },
}

impl Discount {
    /// Validate input ranges before the discount is attached to an order.
    ///
    /// A fixed value exceeding the current subtotal is tolerated here (the
    /// subtotal changes as items come and go); it is clamped at computation
    /// time instead.
    pub fn validate(&self) -> OrderResult<()> {
        match self {
            Discount::Fixed { value } => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(OrderError::InvalidDiscount(format!(
                        "fixed value must be non-negative, got {value}"
                    )));
                }
            }
            Discount::Percentage { value } => {
                if !value.is_finite() || !(0.0..=100.0).contains(value) {
                    return Err(OrderError::InvalidDiscount(format!(
                        "percentage must be between 0 and 100, got {value}"
                    )));
                }
            }
            Discount::BuyXGetY {
                buy_count,
                get_free_count,
                ..
            } => {
                if *buy_count < 1 || *get_free_count < 1 {
                    return Err(OrderError::InvalidDiscount(format!(
                        "buy/get counts must be at least 1, got buy={buy_count} get={get_free_count}"
                    )));
                }
            }
        }
        Ok(())
    }
}
