//! Order engine: lifecycle, numbering, persistence, projections

pub mod manager;
pub mod numbering;
pub mod projections;
pub mod storage;
pub mod tick;

pub use manager::OrderEngine;
pub use projections::DailySummary;
pub use storage::{OrderStorage, StorageError, StorageResult};
pub use tick::KitchenTransition;
