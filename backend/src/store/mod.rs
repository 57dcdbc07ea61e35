//! Persistence layer for the stock engine
//!
//! Services never hold a database handle for stock work. They receive an
//! `Arc<dyn StockStore>` and perform each operation inside one `StockUnit`,
//! which commits or discards all of its writes together. Dropping a unit
//! without committing discards it, so an aborted request leaves no trace.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{MovementType, OrderStatus, ReferenceType};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::{Fault, MemoryStockStore};
pub use postgres::PgStockStore;

/// Line item as seen by the stock engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub item_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

/// Ledger entry about to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockMovement {
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: String,
    pub reference_id: Option<i64>,
    pub reference_type: ReferenceType,
}

/// Persisted ledger entry, joined with the product name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: String,
    pub reference_id: Option<i64>,
    pub reference_type: Option<ReferenceType>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Contribution of this entry to the product's running balance
    pub fn signed_quantity(&self) -> i64 {
        i64::from(self.movement_type.signed(self.quantity))
    }
}

/// Filter for the ledger read path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementFilter {
    pub product_id: Option<i64>,
    pub limit: i64,
}

/// Source of units of work plus the read-only ledger query
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Open a unit of work.
    async fn begin(&self) -> AppResult<Box<dyn StockUnit>>;

    /// Newest-first ledger entries, at most `filter.limit` of them.
    async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<StockMovement>>;
}

/// One atomic unit of stock work
///
/// `lock_*` calls hold their row exclusively until the unit ends.
#[async_trait]
pub trait StockUnit: Send {
    async fn lock_order(&mut self, order_id: i64) -> AppResult<Option<OrderStatus>>;

    /// Line items in insertion order.
    async fn order_lines(&mut self, order_id: i64) -> AppResult<Vec<OrderLine>>;

    /// Current on-hand quantity of a product.
    async fn lock_product(&mut self, product_id: i64) -> AppResult<Option<i32>>;

    async fn write_quantity(&mut self, product_id: i64, quantity: i32) -> AppResult<()>;

    async fn append_movement(&mut self, movement: &NewStockMovement) -> AppResult<i64>;

    async fn write_order_status(&mut self, order_id: i64, status: OrderStatus) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
