//! In-process stock store for tests
//!
//! A unit takes the store-wide lock when it begins and keeps it until it
//! ends, so units are fully serialized. Writes go to a private copy of the
//! tables which replaces the shared copy only on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shared::{OrderStatus, ReferenceType};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{MovementFilter, NewStockMovement, OrderLine, StockMovement, StockStore, StockUnit};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
struct ProductRecord {
    name: String,
    quantity: i32,
}

#[derive(Debug, Clone)]
struct OrderRecord {
    status: OrderStatus,
    lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<i64, ProductRecord>,
    orders: BTreeMap<i64, OrderRecord>,
    movements: Vec<StockMovement>,
    next_item_id: i64,
}

/// A storage failure to raise from the next unit of work
///
/// Call counts are 1-based and local to the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    AppendMovement { call: usize },
    WriteQuantity { call: usize },
    WriteOrderStatus,
    Commit,
}

#[derive(Clone, Default)]
pub struct MemoryStockStore {
    tables: Arc<Mutex<Tables>>,
    pending_fault: Arc<std::sync::Mutex<Option<Fault>>>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product_id: i64, name: &str, quantity: i32) {
        let mut tables = self.tables.lock().await;
        tables.products.insert(
            product_id,
            ProductRecord {
                name: name.to_string(),
                quantity,
            },
        );
    }

    /// Insert an order with `(product_id, quantity)` lines
    pub async fn insert_order(&self, order_id: i64, status: OrderStatus, lines: &[(i64, i32)]) {
        let mut tables = self.tables.lock().await;
        let mut order_lines = Vec::with_capacity(lines.len());
        for &(product_id, quantity) in lines {
            tables.next_item_id += 1;
            order_lines.push(OrderLine {
                item_id: tables.next_item_id,
                product_id,
                quantity,
            });
        }
        tables.orders.insert(
            order_id,
            OrderRecord {
                status,
                lines: order_lines,
            },
        );
    }

    pub async fn quantity(&self, product_id: i64) -> Option<i32> {
        self.tables
            .lock()
            .await
            .products
            .get(&product_id)
            .map(|p| p.quantity)
    }

    pub async fn order_status(&self, order_id: i64) -> Option<OrderStatus> {
        self.tables
            .lock()
            .await
            .orders
            .get(&order_id)
            .map(|o| o.status)
    }

    /// Every ledger entry in append order
    pub async fn movements(&self) -> Vec<StockMovement> {
        self.tables.lock().await.movements.clone()
    }

    /// Ledger entries caused by one order
    pub async fn movements_for_order(&self, order_id: i64) -> Vec<StockMovement> {
        self.tables
            .lock()
            .await
            .movements
            .iter()
            .filter(|m| {
                m.reference_type == Some(ReferenceType::Order) && m.reference_id == Some(order_id)
            })
            .cloned()
            .collect()
    }

    /// Make the next unit of work fail at the given step
    pub fn inject(&self, fault: Fault) {
        if let Ok(mut pending) = self.pending_fault.lock() {
            *pending = Some(fault);
        }
    }

    fn take_fault(&self) -> Option<Fault> {
        self.pending_fault.lock().ok().and_then(|mut f| f.take())
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn begin(&self) -> AppResult<Box<dyn StockUnit>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryStockUnit {
            guard,
            working,
            fault: self.take_fault(),
            appends: 0,
            quantity_writes: 0,
        }))
    }

    async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<StockMovement>> {
        let tables = self.tables.lock().await;
        let limit = usize::try_from(filter.limit.max(0)).unwrap_or(usize::MAX);

        let mut rows: Vec<StockMovement> = tables
            .movements
            .iter()
            .filter(|m| filter.product_id.map_or(true, |id| m.product_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit);
        Ok(rows)
    }
}

pub struct MemoryStockUnit {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    fault: Option<Fault>,
    appends: usize,
    quantity_writes: usize,
}

impl MemoryStockUnit {
    fn injected(step: &str) -> AppError {
        AppError::StorageFailure(format!("injected failure at {}", step))
    }
}

#[async_trait]
impl StockUnit for MemoryStockUnit {
    async fn lock_order(&mut self, order_id: i64) -> AppResult<Option<OrderStatus>> {
        tokio::task::yield_now().await;
        Ok(self.working.orders.get(&order_id).map(|o| o.status))
    }

    async fn order_lines(&mut self, order_id: i64) -> AppResult<Vec<OrderLine>> {
        Ok(self
            .working
            .orders
            .get(&order_id)
            .map(|o| o.lines.clone())
            .unwrap_or_default())
    }

    async fn lock_product(&mut self, product_id: i64) -> AppResult<Option<i32>> {
        tokio::task::yield_now().await;
        Ok(self.working.products.get(&product_id).map(|p| p.quantity))
    }

    async fn write_quantity(&mut self, product_id: i64, quantity: i32) -> AppResult<()> {
        self.quantity_writes += 1;
        if self.fault == Some(Fault::WriteQuantity { call: self.quantity_writes }) {
            return Err(Self::injected("write_quantity"));
        }

        let product = self
            .working
            .products
            .get_mut(&product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;
        product.quantity = quantity;
        Ok(())
    }

    async fn append_movement(&mut self, movement: &NewStockMovement) -> AppResult<i64> {
        self.appends += 1;
        if self.fault == Some(Fault::AppendMovement { call: self.appends }) {
            return Err(Self::injected("append_movement"));
        }

        let product_name = self
            .working
            .products
            .get(&movement.product_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| AppError::NotFound(format!("Product {}", movement.product_id)))?;
        let id = self.working.movements.last().map_or(1, |m| m.id + 1);

        self.working.movements.push(StockMovement {
            id,
            product_id: movement.product_id,
            product_name,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            reason: movement.reason.clone(),
            reference_id: movement.reference_id,
            reference_type: Some(movement.reference_type),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn write_order_status(&mut self, order_id: i64, status: OrderStatus) -> AppResult<()> {
        if self.fault == Some(Fault::WriteOrderStatus) {
            return Err(Self::injected("write_order_status"));
        }

        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))?;
        order.status = status;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        if self.fault == Some(Fault::Commit) {
            return Err(Self::injected("commit"));
        }

        let MemoryStockUnit {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
