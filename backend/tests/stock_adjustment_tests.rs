//! Manual stock adjustment tests
//!
//! - `in` and `out` adjustments update stock and write one manual ledger row
//! - An `out` past zero is refused with no writes
//! - Storage failures roll back both writes

use std::sync::Arc;

use proptest::prelude::*;
use shared::{ManualAdjustment, ManualAdjustmentInput, MovementType, ReferenceType};
use warehouse_backend::error::AppError;
use warehouse_backend::services::StockAdjustmentService;
use warehouse_backend::store::{Fault, MemoryStockStore};

const PRODUCT_C: i64 = 3;

async fn seeded(quantity: i32) -> (MemoryStockStore, StockAdjustmentService) {
    let store = MemoryStockStore::new();
    store.insert_product(PRODUCT_C, "Crate", quantity).await;
    let service = StockAdjustmentService::new(Arc::new(store.clone()));
    (store, service)
}

fn adjustment(movement_type: MovementType, quantity: i32) -> ManualAdjustment {
    ManualAdjustment {
        product_id: PRODUCT_C,
        movement_type,
        quantity,
        reason: ManualAdjustment::DEFAULT_REASON.to_string(),
    }
}

#[tokio::test]
async fn test_out_beyond_stock_is_rejected_without_writes() {
    let (store, service) = seeded(2).await;

    let err = service
        .adjust(adjustment(MovementType::Out, 5))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientStock {
            product_id: PRODUCT_C,
            available: 2,
            requested: 5
        }
    ));
    assert_eq!(store.quantity(PRODUCT_C).await, Some(2));
    assert!(store.movements().await.is_empty());
}

#[tokio::test]
async fn test_in_and_out_adjustments() {
    let (store, service) = seeded(2).await;

    let receipt = service.adjust(adjustment(MovementType::In, 8)).await.unwrap();
    assert_eq!(receipt.new_quantity, 10);

    let receipt = service.adjust(adjustment(MovementType::Out, 10)).await.unwrap();
    assert_eq!(receipt.new_quantity, 0);
    assert_eq!(store.quantity(PRODUCT_C).await, Some(0));

    let rows = store.movements().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].id, receipt.movement_id);
    for row in &rows {
        assert_eq!(row.reference_type, Some(ReferenceType::Manual));
        assert_eq!(row.reference_id, None);
        assert_eq!(row.reason, "Manual adjustment");
    }
    assert_eq!(rows[0].movement_type, MovementType::In);
    assert_eq!(rows[1].movement_type, MovementType::Out);
}

#[tokio::test]
async fn test_unknown_product() {
    let (store, service) = seeded(2).await;

    let mut missing = adjustment(MovementType::In, 1);
    missing.product_id = 404;
    let err = service.adjust(missing).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(store.movements().await.is_empty());
}

#[tokio::test]
async fn test_ledger_failure_rolls_back_quantity() {
    let (store, service) = seeded(2).await;
    store.inject(Fault::AppendMovement { call: 1 });

    let err = service
        .adjust(adjustment(MovementType::In, 4))
        .await
        .unwrap_err();

    assert!(err.is_storage());
    assert_eq!(store.quantity(PRODUCT_C).await, Some(2));
    assert!(store.movements().await.is_empty());
}

#[tokio::test]
async fn test_commit_failure_rolls_back_both_writes() {
    let (store, service) = seeded(2).await;
    store.inject(Fault::Commit);

    service
        .adjust(adjustment(MovementType::Out, 1))
        .await
        .unwrap_err();

    assert_eq!(store.quantity(PRODUCT_C).await, Some(2));
    assert!(store.movements().await.is_empty());
}

#[tokio::test]
async fn test_custom_reason_is_recorded() {
    let (store, service) = seeded(2).await;

    let input: ManualAdjustmentInput = serde_json::from_value(serde_json::json!({
        "product_id": PRODUCT_C,
        "type": "out",
        "quantity": 1,
        "reason": "  Cycle count  "
    }))
    .unwrap();
    service.adjust(input.parse().unwrap()).await.unwrap();

    assert_eq!(store.movements().await[0].reason, "Cycle count");
}

#[test]
fn test_invalid_input_never_reaches_the_store() {
    let cases = [
        serde_json::json!({ "product_id": 3, "type": "sideways", "quantity": 1 }),
        serde_json::json!({ "product_id": 3, "type": "in", "quantity": 0 }),
        serde_json::json!({ "product_id": 3, "type": "in", "quantity": -4 }),
        serde_json::json!({ "type": "in", "quantity": 1 }),
        serde_json::json!({ "product_id": 3, "quantity": 1 }),
    ];

    for case in cases {
        let input: ManualAdjustmentInput = serde_json::from_value(case.clone()).unwrap();
        assert!(input.parse().is_err(), "accepted {}", case);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A rejected `out` leaves no trace; an accepted one lands exactly
    #[test]
    fn prop_out_adjustment_floor(on_hand in 0i32..50, quantity in 1i32..80) {
        tokio_test::block_on(async {
            let (store, service) = seeded(on_hand).await;
            let result = service.adjust(adjustment(MovementType::Out, quantity)).await;

            if quantity > on_hand {
                let is_insufficient = matches!(result, Err(AppError::InsufficientStock { .. }));
                assert!(is_insufficient);
                assert_eq!(store.quantity(PRODUCT_C).await, Some(on_hand));
                assert!(store.movements().await.is_empty());
            } else {
                assert_eq!(result.unwrap().new_quantity, on_hand - quantity);
                assert_eq!(store.movements().await.len(), 1);
            }
        });
    }
}
