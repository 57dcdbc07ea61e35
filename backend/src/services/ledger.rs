//! Stock ledger: append-only audit trail of quantity changes

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::store::{MovementFilter, NewStockMovement, StockMovement, StockStore, StockUnit};

/// Append one entry to the ledger inside an open unit of work
pub async fn record(unit: &mut dyn StockUnit, movement: NewStockMovement) -> AppResult<i64> {
    if movement.quantity <= 0 {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: "quantity must be greater than zero".to_string(),
        });
    }

    let id = unit.append_movement(&movement).await?;
    tracing::debug!(
        movement_id = id,
        product_id = movement.product_id,
        movement_type = %movement.movement_type,
        quantity = movement.quantity,
        reference_type = %movement.reference_type,
        "Recorded stock movement"
    );
    Ok(id)
}

/// Read side of the ledger
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn StockStore>,
    page_size: i64,
}

impl LedgerService {
    pub fn new(store: Arc<dyn StockStore>, page_size: i64) -> Self {
        Self { store, page_size }
    }

    /// Most recent movements first, optionally for one product
    pub async fn list(&self, product_id: Option<i64>) -> AppResult<Vec<StockMovement>> {
        self.store
            .list_movements(MovementFilter {
                product_id,
                limit: self.page_size,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStockStore;
    use shared::{MovementType, ReferenceType};

    fn movement(quantity: i32) -> NewStockMovement {
        NewStockMovement {
            product_id: 1,
            movement_type: MovementType::In,
            quantity,
            reason: "Count correction".to_string(),
            reference_id: None,
            reference_type: ReferenceType::Manual,
        }
    }

    #[tokio::test]
    async fn test_record_rejects_non_positive_quantity() {
        let store = MemoryStockStore::new();
        store.insert_product(1, "Nut", 0).await;

        let mut unit = store.begin().await.unwrap();
        let err = record(unit.as_mut(), movement(0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));
        unit.commit().await.unwrap();

        assert!(store.movements().await.is_empty());
    }

    #[tokio::test]
    async fn test_record_appends() {
        let store = MemoryStockStore::new();
        store.insert_product(1, "Nut", 0).await;

        let mut unit = store.begin().await.unwrap();
        let first = record(unit.as_mut(), movement(3)).await.unwrap();
        let second = record(unit.as_mut(), movement(4)).await.unwrap();
        unit.commit().await.unwrap();

        assert!(second > first);
        let rows = store.movements().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_name, "Nut");
    }
}
