//! Pure pricing computation
//!
//! No state, no persistence: functions over order lines and an optional
//! discount. The engine calls these on every draft mutation and freezes the
//! results at completion.

pub mod calculator;

pub use calculator::{OrderTotals, compute_totals, discount_amount, order_subtotal};
