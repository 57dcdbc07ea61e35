//! Purchase order service: creation, listing and deletion
//!
//! Status changes are handled by `OrderStatusService`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{OrderDraft, OrderStatus};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    supplier_id: i64,
    supplier_name: String,
    order_date: DateTime<Utc>,
    status: String,
    total_amount: Decimal,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|_| {
            AppError::StorageFailure(format!("unexpected value {:?} in orders.status", row.status))
        })?;

        Ok(Order {
            id: row.id,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            order_date: row.order_date,
            status,
            total_amount: row.total_amount,
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Order with its line items
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Body returned by `POST /orders`
#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub id: i64,
    pub message: String,
    pub total_amount: Decimal,
}

/// Held until commit so a concurrent supplier delete waits and then sees the order
const LOCK_SUPPLIER_SQL: &str = "SELECT id FROM suppliers WHERE id = $1 FOR SHARE";

const LOCK_PRODUCTS_SQL: &str =
    "SELECT id FROM products WHERE id = ANY($1) ORDER BY id FOR SHARE";

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.supplier_id, s.name AS supplier_name, o.order_date, o.status, o.total_amount
    FROM orders o
    JOIN suppliers s ON o.supplier_id = s.id
"#;

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Newest orders first
    pub async fn list(&self) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} ORDER BY o.order_date DESC, o.id DESC",
            ORDER_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    pub async fn get(&self, order_id: i64) -> AppResult<OrderWithItems> {
        let order: Order = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE o.id = $1", ORDER_SELECT))
            .bind(order_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))?
            .try_into()?;

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT oi.id, oi.product_id, p.name AS product_name, oi.quantity, oi.unit_price
            FROM order_items oi
            JOIN products p ON oi.product_id = p.id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithItems { order, items })
    }

    /// Insert an order and its lines in one transaction with status `pending`
    pub async fn create(&self, draft: OrderDraft) -> AppResult<OrderCreated> {
        let mut tx = self.db.begin().await?;

        let supplier = sqlx::query_scalar::<_, i64>(LOCK_SUPPLIER_SQL)
            .bind(draft.supplier_id)
            .fetch_optional(&mut *tx)
            .await?;
        if supplier.is_none() {
            return Err(AppError::NotFound(format!("Supplier {}", draft.supplier_id)));
        }

        let wanted: Vec<i64> = draft
            .items
            .iter()
            .map(|i| i.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let found = sqlx::query_scalar::<_, i64>(LOCK_PRODUCTS_SQL)
            .bind(&wanted)
            .fetch_all(&mut *tx)
            .await?;
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(AppError::NotFound(format!("Product {}", missing)));
        }

        let order_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO orders (supplier_id, status, total_amount)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(draft.supplier_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(draft.total_amount)
        .fetch_one(&mut *tx)
        .await?;

        for item in &draft.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            order_id,
            supplier_id = draft.supplier_id,
            lines = draft.items.len(),
            total_amount = %draft.total_amount,
            "Order created"
        );

        Ok(OrderCreated {
            id: order_id,
            message: "Order created".to_string(),
            total_amount: draft.total_amount,
        })
    }

    /// Delete an order and its lines; ledger entries that reference it remain
    pub async fn delete(&self, order_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Order {}", order_id)));
        }

        tracing::info!(order_id, "Order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_rows_are_share_locked() {
        assert!(LOCK_SUPPLIER_SQL.ends_with("FOR SHARE"));
        assert!(LOCK_PRODUCTS_SQL.contains("ORDER BY id FOR SHARE"));
    }
}
