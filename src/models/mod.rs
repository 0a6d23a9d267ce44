//! Data model shared across the engine, storage, and projections

pub mod discount;
pub mod order;
pub mod product;
pub mod settings;

pub use discount::Discount;
pub use order::{
    ItemModifier, KitchenStatus, Order, OrderItem, OrderStatus, PaymentInput, PaymentMethod,
};
pub use product::Product;
pub use settings::StoreSettings;
