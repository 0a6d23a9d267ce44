//! Engine error taxonomy
//!
//! Every engine operation either succeeds or fails with one of these kinds.
//! All of them are local, recoverable conditions; the presentation layer is
//! responsible for turning them into user-facing messages.

use crate::orders::storage::StorageError;
use thiserror::Error;

/// Errors reported by engine operations
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order was started without an authenticated cashier.
    #[error("no authenticated user")]
    NoActiveUser,

    /// An item or discount mutation was attempted with no current draft.
    #[error("no active order")]
    NoActiveOrder,

    /// Completion was attempted on a draft with zero items.
    #[error("cannot complete an empty order")]
    EmptyOrder,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("order already voided: {0}")]
    OrderAlreadyVoided(String),

    /// No order line with the given line id exists on the draft.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    #[error("invalid discount: {0}")]
    InvalidDiscount(String),

    /// Persistence failure. The in-memory state is left untouched when this
    /// is returned; callers may retry the operation.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type OrderResult<T> = Result<T, OrderError>;
