//! redb-based persistence for orders and settings
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | JSON `Order` | Finalized order history |
//! | `counters` | `&str` | `u64` | Per-day order number counter |
//! | `settings` | `"settings"` | JSON `StoreSettings` | Store settings |
//!
//! # Durability
//!
//! redb commits with immediate durability: once `commit()` returns the
//! write is persistent and the file is in a consistent state, which matters
//! on till hardware that gets powered off without warning. The day counter
//! is bumped inside its own write transaction, so an order number is never
//! handed out twice even across a crash.

use crate::models::{Order, StoreSettings};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Finalized orders: key = order id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Counters: day stamp and per-day order sequence
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Settings: single JSON-serialized StoreSettings under SETTINGS_KEY
const SETTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");

const ORDER_DAY_KEY: &str = "order_day";
const ORDER_SEQ_KEY: &str = "order_seq";
const SETTINGS_KEY: &str = "settings";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order and settings storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::initialize(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::initialize(db)
    }

    fn initialize(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
            let _ = write_txn.open_table(SETTINGS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Load the full order history, sorted by creation time then order
    /// number so display order is stable.
    pub fn load_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            orders.push(order);
        }
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.order_number.cmp(&b.order_number))
        });
        Ok(orders)
    }

    /// Insert or update an order, keyed by id.
    pub fn save_order(&self, order: &Order) -> StorageResult<()> {
        let bytes = serde_json::to_vec(order)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            table.insert(order.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a single order by id.
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Draw the next order number for the given day (crash-safe).
    ///
    /// The counter resets to 1 when the stored day differs from `day_key`,
    /// otherwise increments. Committing the bump before the number is used
    /// means a crash can skip a number but never reissue one.
    pub fn next_order_number(&self, day_key: u64) -> StorageResult<u32> {
        let write_txn = self.db.begin_write()?;
        let sequence = {
            let mut table = write_txn.open_table(COUNTERS_TABLE)?;
            let stored_day = table.get(ORDER_DAY_KEY)?.map(|g| g.value());
            let next = if stored_day == Some(day_key) {
                table.get(ORDER_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0) + 1
            } else {
                1
            };
            table.insert(ORDER_DAY_KEY, day_key)?;
            table.insert(ORDER_SEQ_KEY, next)?;
            next
        };
        write_txn.commit()?;
        Ok(sequence as u32)
    }

    /// Load store settings, falling back to defaults when none are saved.
    pub fn load_settings(&self) -> StorageResult<StoreSettings> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SETTINGS_TABLE)?;
        match table.get(SETTINGS_KEY)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(StoreSettings::default()),
        }
    }

    pub fn save_settings(&self, settings: &StoreSettings) -> StorageResult<()> {
        let bytes = serde_json::to_vec(settings)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SETTINGS_TABLE)?;
            table.insert(SETTINGS_KEY, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderItem, Product};

    fn sample_order(seq: u32) -> Order {
        let mut order = Order::new(
            format!("260827-{seq:03}"),
            seq,
            "260827".into(),
            "cashier-1".into(),
            1_000 + i64::from(seq),
        );
        let product = Product::new("p1", "Burger", 8.99);
        order
            .items
            .push(OrderItem::from_product(&product, 2, Some("rare".into()), None));
        order
    }

    #[test]
    fn order_round_trip_preserves_all_fields() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order = sample_order(1);
        storage.save_order(&order).unwrap();

        let loaded = storage.get_order(&order.id).unwrap().unwrap();
        assert_eq!(loaded, order);
    }

    #[test]
    fn save_order_is_upsert() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut order = sample_order(1);
        storage.save_order(&order).unwrap();

        order.is_voided = true;
        storage.save_order(&order).unwrap();

        let orders = storage.load_orders().unwrap();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].is_voided);
    }

    #[test]
    fn load_orders_sorted_by_creation_time() {
        let storage = OrderStorage::open_in_memory().unwrap();
        for seq in [3, 1, 2] {
            storage.save_order(&sample_order(seq)).unwrap();
        }
        let numbers: Vec<u32> = storage
            .load_orders()
            .unwrap()
            .iter()
            .map(|o| o.order_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn order_numbers_are_sequential_within_a_day() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let numbers: Vec<u32> = (0..5)
            .map(|_| storage.next_order_number(260_827).unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn order_number_resets_on_a_new_day() {
        let storage = OrderStorage::open_in_memory().unwrap();
        assert_eq!(storage.next_order_number(260_827).unwrap(), 1);
        assert_eq!(storage.next_order_number(260_827).unwrap(), 2);
        assert_eq!(storage.next_order_number(260_828).unwrap(), 1);
    }

    #[test]
    fn settings_default_then_round_trip() {
        let storage = OrderStorage::open_in_memory().unwrap();
        assert_eq!(storage.load_settings().unwrap(), StoreSettings::default());

        let settings = StoreSettings {
            store_name: "Cafe Central".into(),
            currency_symbol: "$".into(),
            receipt_header: Some("Welcome".into()),
            receipt_footer: None,
            default_preparation_minutes: 20,
        };
        storage.save_settings(&settings).unwrap();
        assert_eq!(storage.load_settings().unwrap(), settings);
    }
}
