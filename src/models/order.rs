//! Order and order-line model

use super::discount::Discount;
use super::product::Product;
use serde::{Deserialize, Serialize};

/// Payment lifecycle status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Canceled,
}

/// Food-preparation lifecycle, independent of the payment status.
///
/// Intended progression is `New -> InProgress -> Ready -> Delivered`, but
/// any status may be set from any prior status (kitchen staff correct
/// mistakes by moving tickets backwards).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KitchenStatus {
    #[default]
    New,
    InProgress,
    Ready,
    Delivered,
}

/// How the order was paid
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Mobile,
    Other,
}

/// Named price adjustment on a single line (e.g. "Extra cheese", +1.50)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemModifier {
    pub name: String,
    pub price_delta: f64,
}

/// One line of an order.
///
/// Embeds a snapshot of the product at the time of adding. The same product
/// may appear on multiple lines (each with its own note); mutations address
/// lines by `line_id`, never by product id, so duplicates are unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique line identity, assigned at creation.
    pub line_id: String,
    pub product_id: String,
    pub name: String,
    pub category: String,
    /// Snapshot unit price at the time of adding.
    pub price: f64,
    /// Snapshot cost at the time of adding (for reporting).
    pub cost: f64,
    /// Always >= 1. A line reduced to zero is removed, never stored.
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<ItemModifier>>,
}

impl OrderItem {
    /// Snapshot a product into a new line.
    pub fn from_product(
        product: &Product,
        quantity: i32,
        note: Option<String>,
        modifiers: Option<Vec<ItemModifier>>,
    ) -> Self {
        Self {
            line_id: uuid::Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            cost: product.cost,
            quantity,
            note,
            modifiers,
        }
    }
}

/// Payment details supplied on completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    /// Amount handed over by the customer (cash). Change is computed by the
    /// engine when this is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tendered: Option<f64>,
}

impl PaymentInput {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            tendered: None,
        }
    }

    pub fn cash(tendered: f64) -> Self {
        Self {
            method: PaymentMethod::Cash,
            tendered: Some(tendered),
        }
    }
}

/// An order: the mutable draft while `Pending`, frozen history afterwards.
///
/// The derived amounts (`total_amount`, `discount_amount`, `final_amount`)
/// are refreshed on every draft mutation and baked in at completion; they
/// are never recomputed for a completed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    /// Human-facing composite number, `YYMMDD-NNN`.
    pub receipt_number: String,
    /// Per-day sequence, starting at 1 each calendar day.
    pub order_number: u32,
    /// Calendar day the number was drawn on, `YYMMDD`. The composite
    /// `(day_stamp, order_number)` is unique across days.
    pub day_stamp: String,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    pub total_amount: f64,
    pub discount_amount: f64,
    /// `max(0, total_amount - discount_amount)`.
    pub final_amount: f64,
    pub status: OrderStatus,
    pub kitchen_status: KitchenStatus,
    #[serde(default)]
    pub is_voided: bool,
    #[serde(default)]
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tendered: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    pub cashier_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Millisecond timestamps.
    pub created_at: i64,
    pub updated_at: i64,
    /// Set when kitchen work begins with an estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion_time: Option<i64>,
}

impl Order {
    /// Create a fresh draft with empty items.
    pub fn new(
        receipt_number: String,
        order_number: u32,
        day_stamp: String,
        cashier_id: String,
        now_ms: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            receipt_number,
            order_number,
            day_stamp,
            items: Vec::new(),
            discount: None,
            total_amount: 0.0,
            discount_amount: 0.0,
            final_amount: 0.0,
            status: OrderStatus::Pending,
            kitchen_status: KitchenStatus::New,
            is_voided: false,
            is_paid: false,
            payment_method: PaymentMethod::Cash,
            tendered: None,
            change: None,
            cashier_id,
            customer_name: None,
            notes: None,
            created_at: now_ms,
            updated_at: now_ms,
            preparation_minutes: None,
            estimated_completion_time: None,
        }
    }

    /// Find a line by its line id.
    pub fn line(&self, line_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.line_id == line_id)
    }

    pub(crate) fn line_mut(&mut self, line_id: &str) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.line_id == line_id)
    }

    /// Append a void annotation to the order notes, preserving prior notes.
    pub(crate) fn append_void_note(&mut self, reason: &str) {
        let annotation = format!("Voided: {reason}");
        self.notes = Some(match self.notes.take() {
            Some(prior) => format!("{prior}\n{annotation}"),
            None => annotation,
        });
    }
}
