//! Product catalog service
//!
//! Products are created with an opening quantity and afterwards only change
//! stock through the adjustment and order transition paths.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{MovementType, ProductDraft, ProductUpdate, ReferenceType};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::store::postgres::INSERT_MOVEMENT_SQL;

const INITIAL_STOCK_REASON: &str = "Initial stock";

#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.quantity, p.price, p.category_id, c.name AS category_name,
           p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
"#;

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Newest products first
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{} ORDER BY p.created_at DESC, p.id DESC",
            PRODUCT_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    pub async fn get(&self, product_id: i64) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!("{} WHERE p.id = $1", PRODUCT_SELECT))
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))
    }

    /// Insert a product; opening stock is written to the ledger in the same transaction
    pub async fn create(&self, draft: ProductDraft) -> AppResult<Product> {
        let mut tx = self.db.begin().await?;

        if let Some(category_id) = draft.category_id {
            ensure_category(&mut tx, category_id).await?;
        }

        let product_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products (name, quantity, price, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(draft.quantity)
        .bind(draft.price)
        .bind(draft.category_id)
        .fetch_one(&mut *tx)
        .await?;

        if draft.quantity > 0 {
            sqlx::query_scalar::<_, i64>(INSERT_MOVEMENT_SQL)
                .bind(product_id)
                .bind(MovementType::In.as_str())
                .bind(draft.quantity)
                .bind(INITIAL_STOCK_REASON)
                .bind(None::<i64>)
                .bind(ReferenceType::Manual.as_str())
                .fetch_one(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(product_id, quantity = draft.quantity, "Product created");

        self.get(product_id).await
    }

    /// Update name, price and category; quantity is not writable here
    pub async fn update(&self, product_id: i64, update: ProductUpdate) -> AppResult<Product> {
        let mut tx = self.db.begin().await?;

        if let Some(category_id) = update.category_id {
            ensure_category(&mut tx, category_id).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $1, price = $2, category_id = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&update.name)
        .bind(update.price)
        .bind(update.category_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {}", product_id)));
        }
        tx.commit().await?;

        self.get(product_id).await
    }

    /// Delete a product with no stock history and no order lines
    pub async fn delete(&self, product_id: i64) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Product {}", product_id)));
        }

        let (movements, order_lines) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM stock_movements WHERE product_id = $1),
                (SELECT COUNT(*) FROM order_items WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if movements > 0 || order_lines > 0 {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: format!(
                    "Cannot delete product: it has {} stock movements and {} order lines",
                    movements, order_lines
                ),
            });
        }

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}

async fn ensure_category(tx: &mut Transaction<'_, Postgres>, category_id: i64) -> AppResult<()> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&mut **tx)
        .await?;

    found
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("Category {}", category_id)))
}
