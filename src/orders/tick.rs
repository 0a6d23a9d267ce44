//! Time-driven kitchen status advancement
//!
//! The engine owns no timer. `pending_transitions` is a pure function of a
//! clock reading and the order history; an external polling loop (or a test
//! with a simulated clock) decides when to call it and feeds the results
//! back through `OrderEngine::update_kitchen_status`.

use crate::models::{KitchenStatus, Order, OrderStatus};

/// How long an order sits in `Ready` before it is considered delivered.
pub const READY_TO_DELIVERED_MS: i64 = 30_000;

/// A kitchen transition the caller should apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitchenTransition {
    pub order_id: String,
    pub to: KitchenStatus,
}

/// Compute the transitions due at `now_ms`:
///
/// - `InProgress` past its estimated completion time moves to `Ready`;
/// - `Ready` for at least 30 seconds (from its last update) moves to
///   `Delivered`.
///
/// Voided and canceled orders never advance.
pub fn pending_transitions(now_ms: i64, orders: &[Order]) -> Vec<KitchenTransition> {
    orders
        .iter()
        .filter(|o| !o.is_voided && o.status != OrderStatus::Canceled)
        .filter_map(|o| match o.kitchen_status {
            KitchenStatus::InProgress => o
                .estimated_completion_time
                .filter(|eta| now_ms >= *eta)
                .map(|_| KitchenTransition {
                    order_id: o.id.clone(),
                    to: KitchenStatus::Ready,
                }),
            KitchenStatus::Ready if now_ms - o.updated_at >= READY_TO_DELIVERED_MS => {
                Some(KitchenTransition {
                    order_id: o.id.clone(),
                    to: KitchenStatus::Delivered,
                })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with(kitchen_status: KitchenStatus) -> Order {
        let mut order = Order::new("260827-001".into(), 1, "260827".into(), "c".into(), 0);
        order.status = OrderStatus::Completed;
        order.kitchen_status = kitchen_status;
        order
    }

    #[test]
    fn in_progress_advances_once_estimate_passes() {
        let mut order = order_with(KitchenStatus::InProgress);
        order.estimated_completion_time = Some(60_000);

        assert!(pending_transitions(59_999, std::slice::from_ref(&order)).is_empty());

        let due = pending_transitions(60_000, std::slice::from_ref(&order));
        assert_eq!(
            due,
            vec![KitchenTransition {
                order_id: order.id.clone(),
                to: KitchenStatus::Ready,
            }]
        );
    }

    #[test]
    fn in_progress_without_estimate_never_auto_advances() {
        let order = order_with(KitchenStatus::InProgress);
        assert!(pending_transitions(i64::MAX, std::slice::from_ref(&order)).is_empty());
    }

    #[test]
    fn ready_advances_after_thirty_seconds() {
        let mut order = order_with(KitchenStatus::Ready);
        order.updated_at = 100_000;

        assert!(pending_transitions(100_000 + 29_999, std::slice::from_ref(&order)).is_empty());

        let due = pending_transitions(100_000 + 30_000, std::slice::from_ref(&order));
        assert_eq!(due[0].to, KitchenStatus::Delivered);
    }

    #[test]
    fn voided_orders_never_advance() {
        let mut order = order_with(KitchenStatus::Ready);
        order.updated_at = 0;
        order.is_voided = true;
        assert!(pending_transitions(i64::MAX, std::slice::from_ref(&order)).is_empty());
    }

    #[test]
    fn delivered_and_new_are_left_alone() {
        let delivered = order_with(KitchenStatus::Delivered);
        let fresh = order_with(KitchenStatus::New);
        assert!(pending_transitions(i64::MAX, &[delivered, fresh]).is_empty());
    }
}
