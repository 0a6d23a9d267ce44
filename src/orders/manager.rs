//! OrderEngine - draft lifecycle, history, and kitchen transitions
//!
//! The engine owns exactly one mutable draft (`current`) plus the in-memory
//! mirror of the persisted history. All operations are synchronous and
//! single-writer; mutations are all-or-nothing per call.
//!
//! # Persistence policy
//!
//! Writes go to storage first and the in-memory history is only updated
//! after the commit succeeds (persist-then-confirm). A storage failure
//! therefore surfaces as `OrderError::Storage` with memory untouched.

use super::numbering;
use super::projections::{self, DailySummary};
use super::storage::OrderStorage;
use super::tick::{self, KitchenTransition};
use crate::error::{OrderError, OrderResult};
use crate::models::{
    Discount, ItemModifier, KitchenStatus, Order, OrderItem, OrderStatus, PaymentInput, Product,
    StoreSettings,
};
use crate::pricing;
use chrono::{Local, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

const MS_PER_MINUTE: i64 = 60_000;

/// The order engine: one cashier session's draft plus the order history.
///
/// Constructed at session start, torn down at session end; the caller owns
/// it, no hidden globals.
pub struct OrderEngine {
    storage: OrderStorage,
    current: Option<Order>,
    history: Vec<Order>,
}

impl OrderEngine {
    /// Build an engine over the given storage, loading the history once.
    pub fn new(storage: OrderStorage) -> OrderResult<Self> {
        let history = storage.load_orders()?;
        info!(orders = history.len(), "order engine started");
        Ok(Self {
            storage,
            current: None,
            history,
        })
    }

    fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// The mutable draft, when one exists.
    pub fn current_order(&self) -> Option<&Order> {
        self.current.as_ref()
    }

    /// The persisted history, oldest first.
    pub fn history(&self) -> &[Order] {
        &self.history
    }

    fn current_mut(&mut self) -> OrderResult<&mut Order> {
        self.current.as_mut().ok_or(OrderError::NoActiveOrder)
    }

    /// Recompute the derived amounts after a draft mutation.
    fn refresh_totals(order: &mut Order) {
        let totals = pricing::compute_totals(&order.items, order.discount.as_ref());
        order.total_amount = totals.total;
        order.discount_amount = totals.discount;
        order.final_amount = totals.final_amount;
    }

    // ========================================================================
    // Draft lifecycle
    // ========================================================================

    /// Start a fresh draft for the given cashier.
    ///
    /// Fails with `NoActiveUser` when no cashier is authenticated. An
    /// existing draft is overwritten; confirming the discard beforehand is a
    /// presentation concern.
    pub fn start_order(&mut self, cashier_id: Option<&str>) -> OrderResult<&Order> {
        let cashier = cashier_id
            .filter(|id| !id.is_empty())
            .ok_or(OrderError::NoActiveUser)?;

        let now = Local::now();
        let sequence = self.storage.next_order_number(numbering::day_key(now))?;
        let day_stamp = numbering::day_stamp(now);
        let receipt = numbering::receipt_number(&day_stamp, sequence);

        if let Some(draft) = &self.current {
            warn!(order_id = %draft.id, "replacing unsaved draft order");
        }

        let order = Order::new(
            receipt,
            sequence,
            day_stamp,
            cashier.to_string(),
            Self::now_ms(),
        );
        info!(
            order_id = %order.id,
            receipt_number = %order.receipt_number,
            cashier_id = %order.cashier_id,
            "draft order started"
        );
        Ok(&*self.current.insert(order))
    }

    /// Discard the draft unconditionally. No persisted trace remains.
    pub fn cancel_order(&mut self) {
        if let Some(draft) = self.current.take() {
            info!(order_id = %draft.id, "draft order discarded");
        }
    }

    // ========================================================================
    // Item mutation
    // ========================================================================

    /// Append a new line snapshotting the product; returns the new line id.
    ///
    /// Always appends, never merges: the same product may sit on several
    /// lines with distinct notes.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i32,
        note: Option<String>,
        modifiers: Option<Vec<ItemModifier>>,
    ) -> OrderResult<String> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        let now = Self::now_ms();
        let order = self.current_mut()?;

        let item = OrderItem::from_product(product, quantity, note, modifiers);
        let line_id = item.line_id.clone();
        debug!(
            order_id = %order.id,
            product_id = %product.id,
            quantity,
            line_id = %line_id,
            "item added"
        );
        order.items.push(item);
        order.updated_at = now;
        Self::refresh_totals(order);
        Ok(line_id)
    }

    /// Remove the addressed line.
    pub fn remove_item(&mut self, line_id: &str) -> OrderResult<()> {
        let now = Self::now_ms();
        let order = self.current_mut()?;
        let position = order
            .items
            .iter()
            .position(|i| i.line_id == line_id)
            .ok_or_else(|| OrderError::ItemNotFound(line_id.to_string()))?;
        let removed = order.items.remove(position);
        debug!(order_id = %order.id, product_id = %removed.product_id, "item removed");
        order.updated_at = now;
        Self::refresh_totals(order);
        Ok(())
    }

    /// Set a line's quantity. Non-positive quantities are rejected with
    /// `InvalidQuantity`; removal is an explicit `remove_item` call.
    pub fn set_item_quantity(&mut self, line_id: &str, quantity: i32) -> OrderResult<()> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        let now = Self::now_ms();
        let order = self.current_mut()?;
        let item = order
            .line_mut(line_id)
            .ok_or_else(|| OrderError::ItemNotFound(line_id.to_string()))?;
        item.quantity = quantity;
        order.updated_at = now;
        Self::refresh_totals(order);
        Ok(())
    }

    /// Replace a line's note.
    pub fn set_item_note(&mut self, line_id: &str, note: Option<String>) -> OrderResult<()> {
        let now = Self::now_ms();
        let order = self.current_mut()?;
        let item = order
            .line_mut(line_id)
            .ok_or_else(|| OrderError::ItemNotFound(line_id.to_string()))?;
        item.note = note;
        order.updated_at = now;
        Ok(())
    }

    // ========================================================================
    // Discount and annotations
    // ========================================================================

    /// Attach, replace, or clear the draft's discount. At most one discount
    /// is attached at a time.
    pub fn apply_discount(&mut self, discount: Option<Discount>) -> OrderResult<()> {
        if let Some(d) = &discount {
            d.validate()?;
        }
        let now = Self::now_ms();
        let order = self.current_mut()?;
        debug!(order_id = %order.id, discount = ?discount, "discount applied");
        order.discount = discount;
        order.updated_at = now;
        Self::refresh_totals(order);
        Ok(())
    }

    pub fn set_customer_name(&mut self, name: Option<String>) -> OrderResult<()> {
        let now = Self::now_ms();
        let order = self.current_mut()?;
        order.customer_name = name;
        order.updated_at = now;
        Ok(())
    }

    pub fn set_order_note(&mut self, note: Option<String>) -> OrderResult<()> {
        let now = Self::now_ms();
        let order = self.current_mut()?;
        order.notes = note;
        order.updated_at = now;
        Ok(())
    }

    // ========================================================================
    // Derived amounts
    // ========================================================================

    /// Draft subtotal; 0 with no draft.
    pub fn order_total(&self) -> f64 {
        self.current.as_ref().map_or(0.0, |o| o.total_amount)
    }

    /// Draft discount amount; 0 with no draft.
    pub fn order_discount(&self) -> f64 {
        self.current.as_ref().map_or(0.0, |o| o.discount_amount)
    }

    /// Draft final amount, never negative; 0 with no draft.
    pub fn final_amount(&self) -> f64 {
        self.current.as_ref().map_or(0.0, |o| o.final_amount)
    }

    // ========================================================================
    // Completion and voiding
    // ========================================================================

    /// Freeze the draft into history: derived amounts are baked in, status
    /// becomes `Completed`, payment is recorded, and the draft is cleared.
    /// The frozen order is returned for receipt rendering.
    pub fn complete_order(&mut self, payment: PaymentInput) -> OrderResult<Order> {
        let draft = self.current.as_ref().ok_or(OrderError::NoActiveOrder)?;
        if draft.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut frozen = draft.clone();
        Self::refresh_totals(&mut frozen);
        frozen.status = OrderStatus::Completed;
        frozen.is_paid = true;
        frozen.payment_method = payment.method;
        if let Some(tendered) = payment.tendered {
            let change = (crate::money::to_decimal(tendered)
                - crate::money::to_decimal(frozen.final_amount))
            .max(Decimal::ZERO);
            frozen.tendered = Some(tendered);
            frozen.change = Some(crate::money::to_f64(change));
        }
        frozen.updated_at = Self::now_ms();

        self.storage.save_order(&frozen)?;
        info!(
            order_id = %frozen.id,
            receipt_number = %frozen.receipt_number,
            final_amount = frozen.final_amount,
            payment_method = ?frozen.payment_method,
            "order completed"
        );
        self.history.push(frozen.clone());
        self.current = None;
        Ok(frozen)
    }

    /// Annotate a completed order as voided. The order stays in history for
    /// audit but drops out of the kitchen and queue projections. Voiding an
    /// already-voided order is rejected.
    pub fn void_order(&mut self, order_id: &str, reason: &str) -> OrderResult<()> {
        let index = self
            .history
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        if self.history[index].is_voided {
            return Err(OrderError::OrderAlreadyVoided(order_id.to_string()));
        }

        let mut updated = self.history[index].clone();
        updated.is_voided = true;
        updated.append_void_note(reason);
        updated.updated_at = Self::now_ms();

        self.storage.save_order(&updated)?;
        info!(order_id = %updated.id, reason, "order voided");
        self.history[index] = updated;
        Ok(())
    }

    // ========================================================================
    // Kitchen
    // ========================================================================

    /// Set a persisted order's kitchen status.
    ///
    /// Transitions are not validated against a fixed edge set; kitchen staff
    /// may move a ticket to any status. Entering `InProgress` with an
    /// estimate records `preparation_minutes` and derives the estimated
    /// completion time; every other transition leaves both untouched.
    pub fn update_kitchen_status(
        &mut self,
        order_id: &str,
        status: KitchenStatus,
        preparation_minutes: Option<i64>,
    ) -> OrderResult<()> {
        let index = self
            .history
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        let now = Self::now_ms();
        let mut updated = self.history[index].clone();
        updated.kitchen_status = status;
        if status == KitchenStatus::InProgress {
            if let Some(minutes) = preparation_minutes {
                updated.preparation_minutes = Some(minutes);
                updated.estimated_completion_time = Some(now + minutes * MS_PER_MINUTE);
            }
        }
        updated.updated_at = now;

        self.storage.save_order(&updated)?;
        info!(
            order_id = %updated.id,
            kitchen_status = ?status,
            preparation_minutes = ?preparation_minutes,
            "kitchen status updated"
        );
        self.history[index] = updated;
        Ok(())
    }

    /// Apply the auto-advance transitions due at `now_ms` and return them.
    ///
    /// The engine owns no timer: an external polling loop calls this on a
    /// schedule. Each transition persists atomically on its own; a storage
    /// failure stops the pass and leaves later transitions for the next
    /// tick.
    pub fn apply_tick(&mut self, now_ms: i64) -> OrderResult<Vec<KitchenTransition>> {
        let due = tick::pending_transitions(now_ms, &self.history);
        for transition in &due {
            self.update_kitchen_status(&transition.order_id, transition.to, None)?;
        }
        Ok(due)
    }

    // ========================================================================
    // Projections and settings
    // ========================================================================

    pub fn active_kitchen_orders(&self) -> Vec<&Order> {
        projections::active_kitchen_orders(&self.history)
    }

    pub fn todays_orders(&self, now_ms: i64) -> Vec<&Order> {
        projections::todays_orders(&self.history, now_ms)
    }

    pub fn queue_orders(&self, now_ms: i64) -> Vec<&Order> {
        projections::queue_orders(&self.history, now_ms)
    }

    pub fn daily_summary(&self, now_ms: i64) -> DailySummary {
        projections::daily_summary(&self.history, now_ms)
    }

    pub fn settings(&self) -> OrderResult<StoreSettings> {
        Ok(self.storage.load_settings()?)
    }

    pub fn update_settings(&self, settings: &StoreSettings) -> OrderResult<()> {
        Ok(self.storage.save_settings(settings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;

    fn engine() -> OrderEngine {
        OrderEngine::new(OrderStorage::open_in_memory().unwrap()).unwrap()
    }

    fn burger() -> Product {
        let mut p = Product::new("p-burger", "Burger", 8.99);
        p.category = "mains".into();
        p
    }

    fn soda() -> Product {
        let mut p = Product::new("p-soda", "Soda", 3.99);
        p.category = "drinks".into();
        p
    }

    #[test]
    fn start_order_requires_a_cashier() {
        let mut engine = engine();
        assert!(matches!(
            engine.start_order(None),
            Err(OrderError::NoActiveUser)
        ));
        assert!(matches!(
            engine.start_order(Some("")),
            Err(OrderError::NoActiveUser)
        ));
        assert!(engine.start_order(Some("cashier-1")).is_ok());
    }

    #[test]
    fn item_mutation_requires_a_draft() {
        let mut engine = engine();
        assert!(matches!(
            engine.add_item(&burger(), 1, None, None),
            Err(OrderError::NoActiveOrder)
        ));
        assert!(matches!(
            engine.apply_discount(Some(Discount::Fixed { value: 1.0 })),
            Err(OrderError::NoActiveOrder)
        ));
    }

    #[test]
    fn add_item_appends_distinct_lines_for_the_same_product() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        let first = engine.add_item(&burger(), 1, None, None).unwrap();
        let second = engine
            .add_item(&burger(), 2, Some("no pickles".into()), None)
            .unwrap();
        assert_ne!(first, second);

        let order = engine.current_order().unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, 26.97); // 8.99 * 3
    }

    #[test]
    fn add_item_rejects_non_positive_quantity() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        assert!(matches!(
            engine.add_item(&burger(), 0, None, None),
            Err(OrderError::InvalidQuantity(0))
        ));
    }

    #[test]
    fn set_quantity_rejects_non_positive_and_updates_totals() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        let line = engine.add_item(&burger(), 2, None, None).unwrap();

        assert!(matches!(
            engine.set_item_quantity(&line, 0),
            Err(OrderError::InvalidQuantity(0))
        ));
        assert!(matches!(
            engine.set_item_quantity("missing", 3),
            Err(OrderError::ItemNotFound(_))
        ));

        engine.set_item_quantity(&line, 5).unwrap();
        assert_eq!(engine.order_total(), 44.95);
    }

    #[test]
    fn remove_item_drops_the_line() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        let line = engine.add_item(&burger(), 2, None, None).unwrap();
        engine.add_item(&soda(), 1, None, None).unwrap();

        engine.remove_item(&line).unwrap();
        let order = engine.current_order().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, "p-soda");
        assert_eq!(engine.order_total(), 3.99);
    }

    #[test]
    fn totals_match_spec_example() {
        // product A 8.99 x 2 + product B 3.99 x 1 = 21.97
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&burger(), 2, None, None).unwrap();
        engine.add_item(&soda(), 1, None, None).unwrap();
        assert_eq!(engine.order_total(), 21.97);
        assert_eq!(engine.final_amount(), 21.97);
    }

    #[test]
    fn discount_replaces_and_clears() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&burger(), 2, None, None).unwrap(); // 17.98

        engine
            .apply_discount(Some(Discount::Percentage { value: 50.0 }))
            .unwrap();
        assert_eq!(engine.order_discount(), 8.99);

        engine
            .apply_discount(Some(Discount::Fixed { value: 2.0 }))
            .unwrap();
        assert_eq!(engine.order_discount(), 2.0);

        engine.apply_discount(None).unwrap();
        assert_eq!(engine.order_discount(), 0.0);
        assert_eq!(engine.final_amount(), 17.98);
    }

    #[test]
    fn discount_validation_is_defensive() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&burger(), 1, None, None).unwrap();
        assert!(matches!(
            engine.apply_discount(Some(Discount::Percentage { value: 120.0 })),
            Err(OrderError::InvalidDiscount(_))
        ));
        // The rejected discount must not stick.
        assert_eq!(engine.order_discount(), 0.0);
    }

    #[test]
    fn complete_rejects_empty_order() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        assert!(matches!(
            engine.complete_order(PaymentInput::new(PaymentMethod::Card)),
            Err(OrderError::EmptyOrder)
        ));
    }

    #[test]
    fn completion_freezes_state_and_clears_the_draft() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&burger(), 2, None, None).unwrap();
        engine
            .apply_discount(Some(Discount::Fixed { value: 3.0 }))
            .unwrap();

        let total = engine.order_total();
        let discount = engine.order_discount();
        let final_amount = engine.final_amount();

        let frozen = engine
            .complete_order(PaymentInput::new(PaymentMethod::Card))
            .unwrap();
        assert_eq!(frozen.total_amount, total);
        assert_eq!(frozen.discount_amount, discount);
        assert_eq!(frozen.final_amount, final_amount);
        assert_eq!(frozen.status, OrderStatus::Completed);
        assert!(frozen.is_paid);
        assert_eq!(frozen.payment_method, PaymentMethod::Card);

        // Draft is gone; further mutation fails rather than silently succeeding.
        assert!(engine.current_order().is_none());
        assert!(matches!(
            engine.add_item(&soda(), 1, None, None),
            Err(OrderError::NoActiveOrder)
        ));
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn cash_completion_computes_change() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&soda(), 1, None, None).unwrap(); // 3.99

        let frozen = engine.complete_order(PaymentInput::cash(10.0)).unwrap();
        assert_eq!(frozen.tendered, Some(10.0));
        assert_eq!(frozen.change, Some(6.01));
    }

    #[test]
    fn cancel_discards_without_trace() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&burger(), 1, None, None).unwrap();
        engine.cancel_order();
        assert!(engine.current_order().is_none());
        assert!(engine.history().is_empty());
        // Canceling with no draft is a no-op.
        engine.cancel_order();
    }

    fn complete_one(engine: &mut OrderEngine) -> String {
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&burger(), 1, None, None).unwrap();
        engine
            .complete_order(PaymentInput::new(PaymentMethod::Cash))
            .unwrap()
            .id
    }

    #[test]
    fn void_annotates_and_rejects_double_void() {
        let mut engine = engine();
        let id = complete_one(&mut engine);

        engine.void_order(&id, "wrong table").unwrap();
        let order = &engine.history()[0];
        assert!(order.is_voided);
        assert_eq!(order.notes.as_deref(), Some("Voided: wrong table"));

        assert!(matches!(
            engine.void_order(&id, "again"),
            Err(OrderError::OrderAlreadyVoided(_))
        ));
        assert!(matches!(
            engine.void_order("missing", "x"),
            Err(OrderError::OrderNotFound(_))
        ));
    }

    #[test]
    fn voided_orders_drop_out_of_kitchen_and_queue_views() {
        let mut engine = engine();
        let id = complete_one(&mut engine);
        assert_eq!(engine.active_kitchen_orders().len(), 1);

        engine.void_order(&id, "spill").unwrap();
        assert!(engine.active_kitchen_orders().is_empty());
        let now = Local::now().timestamp_millis();
        assert!(engine.queue_orders(now).is_empty());
    }

    #[test]
    fn kitchen_estimate_set_only_when_work_begins() {
        let mut engine = engine();
        let id = complete_one(&mut engine);

        engine
            .update_kitchen_status(&id, KitchenStatus::InProgress, Some(10))
            .unwrap();
        let order = &engine.history()[0];
        assert_eq!(order.preparation_minutes, Some(10));
        let eta = order.estimated_completion_time.unwrap();
        assert!(eta > order.updated_at);

        // Moving to Ready leaves the estimate untouched.
        engine
            .update_kitchen_status(&id, KitchenStatus::Ready, None)
            .unwrap();
        let order = &engine.history()[0];
        assert_eq!(order.kitchen_status, KitchenStatus::Ready);
        assert_eq!(order.estimated_completion_time, Some(eta));
        assert_eq!(order.preparation_minutes, Some(10));
    }

    #[test]
    fn tick_auto_advances_in_progress_then_ready() {
        let mut engine = engine();
        let id = complete_one(&mut engine);
        engine
            .update_kitchen_status(&id, KitchenStatus::InProgress, Some(1))
            .unwrap();

        let now = Utc::now().timestamp_millis();

        // Before the estimate passes: nothing due.
        assert!(engine.apply_tick(now).unwrap().is_empty());

        // Two simulated minutes later the order is ready.
        let applied = engine.apply_tick(now + 2 * MS_PER_MINUTE).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].to, KitchenStatus::Ready);
        assert_eq!(engine.history()[0].kitchen_status, KitchenStatus::Ready);

        // Thirty-plus simulated seconds in Ready: delivered.
        let applied = engine.apply_tick(now + 5 * MS_PER_MINUTE).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].to, KitchenStatus::Delivered);
        assert_eq!(
            engine.history()[0].kitchen_status,
            KitchenStatus::Delivered
        );

        // Nothing left to advance.
        assert!(engine.apply_tick(now + 10 * MS_PER_MINUTE).unwrap().is_empty());
    }

    #[test]
    fn order_numbers_increase_within_the_day() {
        let mut engine = engine();
        let mut numbers = Vec::new();
        for _ in 0..3 {
            engine.start_order(Some("c1")).unwrap();
            engine.add_item(&soda(), 1, None, None).unwrap();
            let frozen = engine
                .complete_order(PaymentInput::new(PaymentMethod::Cash))
                .unwrap();
            numbers.push(frozen.order_number);
        }
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn starting_a_new_order_replaces_the_draft() {
        let mut engine = engine();
        engine.start_order(Some("c1")).unwrap();
        engine.add_item(&burger(), 1, None, None).unwrap();

        engine.start_order(Some("c1")).unwrap();
        let order = engine.current_order().unwrap();
        assert!(order.items.is_empty());
        assert_eq!(order.order_number, 2);
    }
}
