//! Tillpoint - restaurant point-of-sale order engine
//!
//! Owns the lifecycle of a single draft order plus the history of finalized
//! orders: item mutation, discount computation, totals, completion, voiding,
//! and kitchen-status progression. Persistence is an embedded redb store;
//! everything else (rendering, authentication, printing) lives with the
//! caller.
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── models/        # serde data model: product, order, discount, settings
//! ├── pricing/       # pure totals and discount computation
//! ├── orders/        # engine, numbering, projections, tick, storage
//! ├── catalog.rs     # catalog provider facade
//! ├── money.rs       # decimal helpers
//! └── error.rs       # error taxonomy
//! ```
//!
//! The engine is synchronous and single-writer by design: one cashier
//! session mutates the draft at a time, and the kitchen auto-advance is a
//! pure `tick` function driven by an external polling loop.

pub mod catalog;
pub mod error;
pub mod models;
pub mod money;
pub mod orders;
pub mod pricing;

pub use catalog::ProductCatalog;
pub use error::{OrderError, OrderResult};
pub use models::{
    Discount, ItemModifier, KitchenStatus, Order, OrderItem, OrderStatus, PaymentInput,
    PaymentMethod, Product, StoreSettings,
};
pub use orders::manager::OrderEngine;
pub use orders::storage::{OrderStorage, StorageError};
pub use orders::tick::{self, KitchenTransition};
