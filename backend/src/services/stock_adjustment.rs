//! Manual stock adjustments
//!
//! Unlike order cancellation, an `out` adjustment may never drive stock below
//! zero; it is refused before anything is written.

use std::sync::Arc;

use serde::Serialize;
use shared::{FloorPolicy, ManualAdjustment, ReferenceType};
use tracing::instrument;

use crate::error::AppResult;
use crate::services::{inventory, ledger};
use crate::store::{NewStockMovement, StockStore, StockUnit};

/// Result of a committed adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdjustmentReceipt {
    pub movement_id: i64,
    pub new_quantity: i32,
}

/// Body returned by `POST /stock-movements`
#[derive(Debug, Serialize)]
pub struct AdjustmentResponse {
    pub id: i64,
    pub message: String,
    pub new_quantity: i32,
}

impl From<AdjustmentReceipt> for AdjustmentResponse {
    fn from(receipt: AdjustmentReceipt) -> Self {
        Self {
            id: receipt.movement_id,
            message: "Stock movement recorded".to_string(),
            new_quantity: receipt.new_quantity,
        }
    }
}

#[derive(Clone)]
pub struct StockAdjustmentService {
    store: Arc<dyn StockStore>,
}

impl StockAdjustmentService {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self { store }
    }

    #[instrument(
        skip(self, adjustment),
        fields(
            product_id = adjustment.product_id,
            movement_type = %adjustment.movement_type,
            quantity = adjustment.quantity
        )
    )]
    pub async fn adjust(&self, adjustment: ManualAdjustment) -> AppResult<AdjustmentReceipt> {
        let mut unit = self.store.begin().await?;

        match apply(unit.as_mut(), &adjustment).await {
            Ok(receipt) => {
                if let Err(e) = unit.commit().await {
                    tracing::warn!(error = %e, step = "commit", "Adjustment rolled back");
                    return Err(e);
                }
                tracing::info!(
                    movement_id = receipt.movement_id,
                    new_quantity = receipt.new_quantity,
                    "Manual adjustment recorded"
                );
                Ok(receipt)
            }
            Err(e) => {
                if e.is_storage() {
                    tracing::warn!(error = %e, "Adjustment rolled back");
                }
                if let Err(rollback_err) = unit.rollback().await {
                    tracing::error!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

async fn apply(unit: &mut dyn StockUnit, adjustment: &ManualAdjustment) -> AppResult<AdjustmentReceipt> {
    let new_quantity = inventory::adjust(
        unit,
        adjustment.product_id,
        adjustment.delta(),
        FloorPolicy::Reject,
    )
    .await?;

    let movement_id = ledger::record(
        unit,
        NewStockMovement {
            product_id: adjustment.product_id,
            movement_type: adjustment.movement_type,
            quantity: adjustment.quantity,
            reason: adjustment.reason.clone(),
            reference_id: None,
            reference_type: ReferenceType::Manual,
        },
    )
    .await?;

    Ok(AdjustmentReceipt {
        movement_id,
        new_quantity,
    })
}
