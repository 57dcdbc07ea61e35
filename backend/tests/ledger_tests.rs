//! Stock ledger read path tests

use std::sync::Arc;

use shared::{ManualAdjustment, MovementType};
use warehouse_backend::services::{LedgerService, StockAdjustmentService};
use warehouse_backend::store::MemoryStockStore;

async fn with_history(page_size: i64) -> (MemoryStockStore, LedgerService) {
    let store = MemoryStockStore::new();
    store.insert_product(1, "Pallet", 0).await;
    store.insert_product(2, "Strap", 0).await;

    let adjustments = StockAdjustmentService::new(Arc::new(store.clone()));
    for (product_id, quantity) in [(1, 5), (2, 1), (1, 2), (2, 4), (1, 3)] {
        adjustments
            .adjust(ManualAdjustment {
                product_id,
                movement_type: MovementType::In,
                quantity,
                reason: format!("Delivery of {}", quantity),
            })
            .await
            .unwrap();
    }

    let ledger = LedgerService::new(Arc::new(store.clone()), page_size);
    (store, ledger)
}

#[tokio::test]
async fn test_newest_first() {
    let (_, ledger) = with_history(200).await;

    let rows = ledger.list(None).await.unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(
        rows.iter().map(|m| m.quantity).collect::<Vec<_>>(),
        vec![3, 4, 2, 1, 5]
    );
    assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn test_filter_by_product() {
    let (_, ledger) = with_history(200).await;

    let rows = ledger.list(Some(2)).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|m| m.product_id == 2 && m.product_name == "Strap"));

    assert!(ledger.list(Some(77)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_page_size_caps_results() {
    let (_, ledger) = with_history(3).await;

    let rows = ledger.list(None).await.unwrap();
    assert_eq!(
        rows.iter().map(|m| m.quantity).collect::<Vec<_>>(),
        vec![3, 4, 2]
    );
}

#[tokio::test]
async fn test_ledger_reconciles_without_clamping() {
    let (store, ledger) = with_history(200).await;

    for product_id in [1, 2] {
        let balance: i64 = ledger
            .list(Some(product_id))
            .await
            .unwrap()
            .iter()
            .map(|m| m.signed_quantity())
            .sum();
        assert_eq!(balance, i64::from(store.quantity(product_id).await.unwrap()));
    }
}

#[test]
fn test_movement_serializes_type_field() {
    let movement = warehouse_backend::store::StockMovement {
        id: 1,
        product_id: 1,
        product_name: "Pallet".to_string(),
        movement_type: MovementType::Out,
        quantity: 2,
        reason: "Order #4 cancelled — stock reversed".to_string(),
        reference_id: Some(4),
        reference_type: Some(shared::ReferenceType::Order),
        created_at: chrono::Utc::now(),
    };

    let json = serde_json::to_value(&movement).unwrap();
    assert_eq!(json["type"], "out");
    assert_eq!(json["reference_type"], "order");
    assert_eq!(json["product_name"], "Pallet");
}
