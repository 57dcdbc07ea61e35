//! PostgreSQL implementation of the stock persistence layer

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{MovementType, OrderStatus, ReferenceType};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{MovementFilter, NewStockMovement, OrderLine, StockMovement, StockStore, StockUnit};
use crate::error::{AppError, AppResult};

pub(crate) const INSERT_MOVEMENT_SQL: &str = r#"
    INSERT INTO stock_movements (product_id, type, quantity, reason, reference_id, reference_type)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id
"#;

/// Stock store backed by a connection pool; each unit is one transaction
#[derive(Clone)]
pub struct PgStockStore {
    db: PgPool,
}

impl PgStockStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Row for the ledger listing
#[derive(Debug, FromRow)]
struct MovementRow {
    id: i64,
    product_id: i64,
    product_name: String,
    #[sqlx(rename = "type")]
    movement_type: String,
    quantity: i32,
    reason: String,
    reference_id: Option<i64>,
    reference_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = row
            .movement_type
            .parse::<MovementType>()
            .map_err(|_| corrupt("stock_movements.type", &row.movement_type))?;
        let reference_type = row
            .reference_type
            .as_deref()
            .map(|r| r.parse::<ReferenceType>().map_err(|_| corrupt("stock_movements.reference_type", r)))
            .transpose()?;

        Ok(StockMovement {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            movement_type,
            quantity: row.quantity,
            reason: row.reason,
            reference_id: row.reference_id,
            reference_type,
            created_at: row.created_at,
        })
    }
}

fn corrupt(column: &str, value: &str) -> AppError {
    AppError::StorageFailure(format!("unexpected value {:?} in {}", value, column))
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn begin(&self) -> AppResult<Box<dyn StockUnit>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgStockUnit { tx }))
    }

    async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT sm.id, sm.product_id, p.name AS product_name, sm.type, sm.quantity,
                   sm.reason, sm.reference_id, sm.reference_type, sm.created_at
            FROM stock_movements sm
            JOIN products p ON sm.product_id = p.id
            WHERE ($1::BIGINT IS NULL OR sm.product_id = $1)
            ORDER BY sm.created_at DESC, sm.id DESC
            LIMIT $2
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }
}

/// One database transaction; dropping it uncommitted rolls back
pub struct PgStockUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StockUnit for PgStockUnit {
    async fn lock_order(&mut self, order_id: i64) -> AppResult<Option<OrderStatus>> {
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        status
            .map(|s| s.parse::<OrderStatus>().map_err(|_| corrupt("orders.status", &s)))
            .transpose()
    }

    async fn order_lines(&mut self, order_id: i64) -> AppResult<Vec<OrderLine>> {
        let rows = sqlx::query_as::<_, (i64, i64, i32)>(
            "SELECT id, product_id, quantity FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(item_id, product_id, quantity)| OrderLine {
                item_id,
                product_id,
                quantity,
            })
            .collect())
    }

    async fn lock_product(&mut self, product_id: i64) -> AppResult<Option<i32>> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(quantity)
    }

    async fn write_quantity(&mut self, product_id: i64, quantity: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET quantity = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {}", product_id)));
        }
        Ok(())
    }

    async fn append_movement(&mut self, movement: &NewStockMovement) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(INSERT_MOVEMENT_SQL)
            .bind(movement.product_id)
            .bind(movement.movement_type.as_str())
            .bind(movement.quantity)
            .bind(&movement.reason)
            .bind(movement.reference_id)
            .bind(movement.reference_type.as_str())
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(id)
    }

    async fn write_order_status(&mut self, order_id: i64, status: OrderStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(order_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Order {}", order_id)));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
