//! Read-only access to business records for job handlers.
//!
//! The engine never owns these records; it only reads the fields it needs.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an order was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PaidOnTime,
    PaidLate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub account_id: String,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub store_id: String,
    pub current_tubes_left: f64,
    /// Average tubes sold per day, when known.
    #[serde(default)]
    pub daily_usage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordStoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record query failed: {0}")]
    Query(String),
}

/// Async, read-only query interface over the business record store.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Orders created in `[start, end)`.
    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, RecordStoreError>;

    /// Current inventory level of every store.
    async fn inventory_levels(&self) -> Result<Vec<InventoryRecord>, RecordStoreError>;

    /// Every known customer account.
    async fn accounts(&self) -> Result<Vec<AccountRecord>, RecordStoreError>;
}

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    orders: RwLock<Vec<OrderRecord>>,
    inventory: RwLock<Vec<InventoryRecord>>,
    accounts: RwLock<Vec<AccountRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: OrderRecord) -> Result<(), RecordStoreError> {
        self.orders.write().map_err(poisoned)?.push(order);
        Ok(())
    }

    pub fn insert_inventory(&self, record: InventoryRecord) -> Result<(), RecordStoreError> {
        self.inventory.write().map_err(poisoned)?.push(record);
        Ok(())
    }

    pub fn insert_account(&self, account: AccountRecord) -> Result<(), RecordStoreError> {
        self.accounts.write().map_err(poisoned)?.push(account);
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RecordStoreError {
    RecordStoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, RecordStoreError> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders
            .iter()
            .filter(|o| o.created_at >= start && o.created_at < end)
            .cloned()
            .collect())
    }

    async fn inventory_levels(&self) -> Result<Vec<InventoryRecord>, RecordStoreError> {
        Ok(self.inventory.read().map_err(poisoned)?.clone())
    }

    async fn accounts(&self) -> Result<Vec<AccountRecord>, RecordStoreError> {
        Ok(self.accounts.read().map_err(poisoned)?.clone())
    }
}
