//! Order totals and discount calculation
//!
//! # Calculation steps
//!
//! 1. Subtotal: sum over lines of (snapshot unit price + modifier deltas) x quantity
//! 2. Discount amount per the attached variant, clamped to the subtotal
//! 3. Final amount: `max(0, subtotal - discount)`
//!
//! BuyXGetY groups lines by product (quantities merged across lines of the
//! same product) and works on the bare snapshot unit price, modifiers
//! excluded. Without a product restriction the free-unit budget is derived
//! from the combined quantity of all products and consumed against the
//! cheapest eligible units first. Cheapest-first is a deliberate tie-break:
//! it grants the least discount, and changing it silently changes financial
//! outcomes for merchants.

use crate::models::{Discount, OrderItem};
use crate::money::{to_decimal, to_f64};
use rust_decimal::Decimal;

/// Derived order amounts, rounded to 2 decimal places
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderTotals {
    pub total: f64,
    pub discount: f64,
    pub final_amount: f64,
}

/// Effective unit price for subtotal purposes: snapshot price plus all
/// modifier deltas.
fn line_unit_price(item: &OrderItem) -> Decimal {
    let modifier_sum: Decimal = item
        .modifiers
        .as_ref()
        .map(|mods| mods.iter().map(|m| to_decimal(m.price_delta)).sum())
        .unwrap_or(Decimal::ZERO);
    to_decimal(item.price) + modifier_sum
}

/// Sum of line totals before any discount
pub fn order_subtotal(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|item| line_unit_price(item) * Decimal::from(item.quantity))
        .sum()
}

/// One product's merged presence in the order: bare snapshot unit price and
/// combined quantity across lines. Insertion order is preserved so sorting
/// ties stay deterministic.
struct ProductGroup {
    product_id: String,
    unit_price: Decimal,
    quantity: i64,
}

/// Merge lines by product id. The unit price is taken from the first line
/// seen for the product; lines added from the same catalog entry share the
/// same snapshot price.
fn product_groups(items: &[OrderItem]) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.product_id == item.product_id) {
            Some(group) => group.quantity += i64::from(item.quantity),
            None => groups.push(ProductGroup {
                product_id: item.product_id.clone(),
                unit_price: to_decimal(item.price),
                quantity: i64::from(item.quantity),
            }),
        }
    }
    groups
}

/// BuyXGetY discount amount.
///
/// Restricted form: each qualifying product group earns
/// `floor(qty / (buy + get)) * get` free units of its own price.
///
/// Global form: the free-unit budget comes from the combined quantity of
/// all products, then is consumed greedily against groups in ascending
/// unit-price order until exhausted.
fn buy_x_get_y_amount(
    items: &[OrderItem],
    buy_count: u32,
    get_free_count: u32,
    applicable_product_ids: Option<&[String]>,
) -> Decimal {
    let cycle_len = i64::from(buy_count) + i64::from(get_free_count);
    if cycle_len <= 0 {
        return Decimal::ZERO;
    }

    let groups = product_groups(items);

    match applicable_product_ids {
        Some(ids) => groups
            .iter()
            .filter(|g| ids.iter().any(|id| *id == g.product_id))
            .map(|g| {
                let free_units = (g.quantity / cycle_len) * i64::from(get_free_count);
                g.unit_price * Decimal::from(free_units)
            })
            .sum(),
        None => {
            let total_quantity: i64 = groups.iter().map(|g| g.quantity).sum();
            let mut free_budget = (total_quantity / cycle_len) * i64::from(get_free_count);

            let mut by_price: Vec<&ProductGroup> = groups.iter().collect();
            by_price.sort_by_key(|g| g.unit_price);

            let mut amount = Decimal::ZERO;
            for group in by_price {
                if free_budget == 0 {
                    break;
                }
                let consumed = group.quantity.min(free_budget);
                amount += group.unit_price * Decimal::from(consumed);
                free_budget -= consumed;
            }
            amount
        }
    }
}

/// Discount amount for the attached variant, clamped to the subtotal so the
/// final amount never goes negative. An over-range stored value (percentage
/// beyond 100, fixed beyond subtotal) is tolerated here; validation of
/// inputs happens when the discount is attached.
pub fn discount_amount(items: &[OrderItem], discount: &Discount) -> Decimal {
    let subtotal = order_subtotal(items);
    let raw = match discount {
        Discount::Fixed { value } => to_decimal(*value),
        Discount::Percentage { value } => subtotal * to_decimal(*value) / Decimal::ONE_HUNDRED,
        Discount::BuyXGetY {
            buy_count,
            get_free_count,
            applicable_product_ids,
        } => buy_x_get_y_amount(
            items,
            *buy_count,
            *get_free_count,
            applicable_product_ids.as_deref(),
        ),
    };
    raw.min(subtotal).max(Decimal::ZERO)
}

/// Compute all derived amounts for an order
pub fn compute_totals(items: &[OrderItem], discount: Option<&Discount>) -> OrderTotals {
    let subtotal = order_subtotal(items);
    let discounted = discount
        .map(|d| discount_amount(items, d))
        .unwrap_or(Decimal::ZERO);
    let final_amount = (subtotal - discounted).max(Decimal::ZERO);

    OrderTotals {
        total: to_f64(subtotal),
        discount: to_f64(discounted),
        final_amount: to_f64(final_amount),
    }
}
