//! On-hand quantity updates
//!
//! The only code path that writes `products.quantity` after creation. Callers
//! pass the open unit of work so the update commits or rolls back with the
//! ledger entry that accompanies it.

use shared::{apply_delta, FloorPolicy};

use crate::error::{AppError, AppResult};
use crate::store::StockUnit;

/// Apply a signed delta to a product and return its new quantity
///
/// A negative delta that overshoots the on-hand quantity is floored at zero
/// under `FloorPolicy::Clamp` and refused under `FloorPolicy::Reject`; in the
/// latter case nothing is written.
pub async fn adjust(
    unit: &mut dyn StockUnit,
    product_id: i64,
    delta: i32,
    policy: FloorPolicy,
) -> AppResult<i32> {
    let current = unit
        .lock_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;

    let next = apply_delta(current, delta, policy)
        .map_err(|e| AppError::from_stock(product_id, e))?;

    if next != current {
        unit.write_quantity(product_id, next).await?;
    }

    tracing::debug!(product_id, current, delta, next, "Adjusted on-hand quantity");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStockStore, StockStore};

    #[tokio::test]
    async fn test_adjust_credits_and_clamps() {
        let store = MemoryStockStore::new();
        store.insert_product(1, "Bolt", 3).await;

        let mut unit = store.begin().await.unwrap();
        assert_eq!(adjust(unit.as_mut(), 1, 4, FloorPolicy::Clamp).await.unwrap(), 7);
        assert_eq!(adjust(unit.as_mut(), 1, -10, FloorPolicy::Clamp).await.unwrap(), 0);
        unit.commit().await.unwrap();

        assert_eq!(store.quantity(1).await, Some(0));
    }

    #[tokio::test]
    async fn test_adjust_reject_leaves_quantity() {
        let store = MemoryStockStore::new();
        store.insert_product(1, "Bolt", 2).await;

        let mut unit = store.begin().await.unwrap();
        let err = adjust(unit.as_mut(), 1, -5, FloorPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock {
                product_id: 1,
                available: 2,
                requested: 5
            }
        ));
        unit.commit().await.unwrap();

        assert_eq!(store.quantity(1).await, Some(2));
    }

    #[tokio::test]
    async fn test_adjust_unknown_product() {
        let store = MemoryStockStore::new();
        let mut unit = store.begin().await.unwrap();
        let err = adjust(unit.as_mut(), 42, 1, FloorPolicy::Clamp)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
