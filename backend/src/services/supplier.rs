//! Supplier service

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::SupplierDraft;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

const SUPPLIER_COLUMNS: &str = "id, name, contact_person, phone, email, address, created_at";

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers ORDER BY id DESC",
            SUPPLIER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    pub async fn get(&self, supplier_id: i64) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Supplier {}", supplier_id)))
    }

    pub async fn create(&self, draft: SupplierDraft) -> AppResult<Supplier> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.contact_person)
        .bind(&draft.phone)
        .bind(&draft.email)
        .bind(&draft.address)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(supplier_id = supplier.id, "Supplier created");
        Ok(supplier)
    }

    pub async fn update(&self, supplier_id: i64, draft: SupplierDraft) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = $2, phone = $3, email = $4, address = $5
            WHERE id = $6
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.contact_person)
        .bind(&draft.phone)
        .bind(&draft.email)
        .bind(&draft.address)
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Supplier {}", supplier_id)))
    }

    /// Delete a supplier that no order references
    pub async fn delete(&self, supplier_id: i64) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM suppliers WHERE id = $1 FOR UPDATE",
        )
        .bind(supplier_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Supplier {}", supplier_id)));
        }

        let order_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE supplier_id = $1",
        )
        .bind(supplier_id)
        .fetch_one(&mut *tx)
        .await?;

        if order_count > 0 {
            return Err(AppError::Conflict {
                resource: "supplier".to_string(),
                message: format!(
                    "Cannot delete supplier: {} orders reference it",
                    order_count
                ),
            });
        }

        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}
