//! Read-only projections over the order history
//!
//! Nothing here is stored: the kitchen display, the customer queue, and the
//! daily summary are all derived on demand from the persisted history.

use crate::models::{KitchenStatus, Order, OrderStatus, PaymentMethod};
use crate::money::{to_decimal, to_f64};
use chrono::{Local, TimeZone};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn local_date(ms: i64) -> Option<chrono::NaiveDate> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.date_naive())
}

/// Whether two millisecond timestamps fall on the same local calendar day
/// (day boundary at local midnight).
pub fn same_local_day(a_ms: i64, b_ms: i64) -> bool {
    match (local_date(a_ms), local_date(b_ms)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Orders the kitchen display works: not voided, payment status still
/// relevant, food not yet ready.
pub fn active_kitchen_orders(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| {
            !o.is_voided
                && matches!(o.status, OrderStatus::Pending | OrderStatus::Completed)
                && matches!(
                    o.kitchen_status,
                    KitchenStatus::New | KitchenStatus::InProgress
                )
        })
        .collect()
}

/// Orders created on the same local calendar day as `now_ms`.
pub fn todays_orders(orders: &[Order], now_ms: i64) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| same_local_day(o.created_at, now_ms))
        .collect()
}

/// Customer-facing queue: today's undelivered, non-voided orders in
/// ascending order-number sequence.
pub fn queue_orders(orders: &[Order], now_ms: i64) -> Vec<&Order> {
    let mut queue: Vec<&Order> = orders
        .iter()
        .filter(|o| {
            !o.is_voided
                && o.kitchen_status != KitchenStatus::Delivered
                && same_local_day(o.created_at, now_ms)
        })
        .collect();
    queue.sort_by_key(|o| o.order_number);
    queue
}

/// End-of-day figures for today's orders. Voided orders are counted but
/// excluded from revenue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySummary {
    pub order_count: usize,
    pub voided_count: usize,
    pub gross_total: f64,
    pub discount_total: f64,
    pub net_total: f64,
    pub takings_by_method: BTreeMap<PaymentMethod, f64>,
}

pub fn daily_summary(orders: &[Order], now_ms: i64) -> DailySummary {
    let today = todays_orders(orders, now_ms);

    let mut summary = DailySummary {
        order_count: today.len(),
        ..DailySummary::default()
    };

    let mut gross = Decimal::ZERO;
    let mut discount = Decimal::ZERO;
    let mut net = Decimal::ZERO;
    let mut by_method: BTreeMap<PaymentMethod, Decimal> = BTreeMap::new();

    for order in today {
        if order.is_voided {
            summary.voided_count += 1;
            continue;
        }
        gross += to_decimal(order.total_amount);
        discount += to_decimal(order.discount_amount);
        net += to_decimal(order.final_amount);
        *by_method.entry(order.payment_method).or_default() += to_decimal(order.final_amount);
    }

    summary.gross_total = to_f64(gross);
    summary.discount_total = to_f64(discount);
    summary.net_total = to_f64(net);
    summary.takings_by_method = by_method.into_iter().map(|(k, v)| (k, to_f64(v))).collect();
    summary
}
