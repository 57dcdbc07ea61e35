//! Product category service

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::CategoryDraft;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn create(&self, draft: CategoryDraft) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(category_id = category.id, "Category created");
        Ok(category)
    }

    /// Delete a category that no product uses
    pub async fn delete(&self, category_id: i64) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM categories WHERE id = $1 FOR UPDATE",
        )
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Category {}", category_id)));
        }

        let product_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await?;

        if product_count > 0 {
            return Err(AppError::Conflict {
                resource: "category".to_string(),
                message: format!(
                    "Cannot delete category: {} products are linked to it",
                    product_count
                ),
            });
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}
