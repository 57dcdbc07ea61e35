//! Order status transition engine
//!
//! A transition runs as one unit of work:
//! lock order -> plan -> load lines -> lock products (ascending id) ->
//! adjust + record per line -> write status -> commit.
//! Any failure after the order is locked rolls the whole unit back.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use shared::{
    plan_transition, transition_reason, FloorPolicy, MovementType, OrderStatus, ReferenceType,
    TransitionPlan,
};
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::services::{inventory, ledger};
use crate::store::{NewStockMovement, StockStore, StockUnit};

/// Result of a transition request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The order already had the requested status.
    Unchanged { status: OrderStatus },
    Updated {
        from: OrderStatus,
        to: OrderStatus,
        /// Ledger entries written, in line item order
        movements: Vec<i64>,
    },
}

impl TransitionOutcome {
    pub fn message(&self) -> String {
        match self {
            TransitionOutcome::Unchanged { .. } => "Status unchanged".to_string(),
            TransitionOutcome::Updated { to, .. } => format!("Order status updated to {}", to),
        }
    }

    /// Status stored on the order after the request
    pub fn status(&self) -> OrderStatus {
        match self {
            TransitionOutcome::Unchanged { status } => *status,
            TransitionOutcome::Updated { to, .. } => *to,
        }
    }

    pub fn movement_count(&self) -> usize {
        match self {
            TransitionOutcome::Unchanged { .. } => 0,
            TransitionOutcome::Updated { movements, .. } => movements.len(),
        }
    }
}

/// Body returned by `PATCH /orders/:id/status`
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub message: String,
    pub status: OrderStatus,
    pub movements: usize,
}

impl From<TransitionOutcome> for TransitionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            message: outcome.message(),
            status: outcome.status(),
            movements: outcome.movement_count(),
        }
    }
}

#[derive(Clone)]
pub struct OrderStatusService {
    store: Arc<dyn StockStore>,
}

impl OrderStatusService {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self { store }
    }

    /// Move an order to `requested`, applying the stock effect of the move
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        order_id: i64,
        requested: OrderStatus,
    ) -> AppResult<TransitionOutcome> {
        let mut unit = self.store.begin().await?;

        match apply(unit.as_mut(), order_id, requested).await {
            Ok(outcome @ TransitionOutcome::Unchanged { .. }) => {
                unit.rollback().await?;
                tracing::debug!(order_id, "Status unchanged");
                Ok(outcome)
            }
            Ok(outcome) => {
                if let Err(e) = unit.commit().await {
                    tracing::warn!(order_id, error = %e, step = "commit", "Transition rolled back");
                    return Err(e);
                }
                if let TransitionOutcome::Updated { from, to, movements } = &outcome {
                    tracing::info!(
                        order_id,
                        from = %from,
                        to = %to,
                        movements = movements.len(),
                        "Order status updated"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                if e.is_storage() {
                    tracing::warn!(order_id, error = %e, "Transition rolled back");
                }
                if let Err(rollback_err) = unit.rollback().await {
                    tracing::error!(order_id, error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

async fn apply(
    unit: &mut dyn StockUnit,
    order_id: i64,
    requested: OrderStatus,
) -> AppResult<TransitionOutcome> {
    let current = unit
        .lock_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))?;

    let plan = plan_transition(current, requested);
    if plan == TransitionPlan::Unchanged {
        return Ok(TransitionOutcome::Unchanged { status: current });
    }
    if TransitionPlan::is_undefined_rule(current, requested) {
        tracing::warn!(
            order_id,
            from = %current,
            to = %requested,
            "No stock rule for this transition; overwriting status only"
        );
    }

    let mut movements = Vec::new();
    if plan.touches_stock() {
        let lines = unit.order_lines(order_id).await?;

        // Products are locked in ascending id order before any write.
        let product_ids: BTreeSet<i64> = lines.iter().map(|l| l.product_id).collect();
        for &product_id in &product_ids {
            unit.lock_product(product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;
        }

        let (movement_type, sign) = match plan {
            TransitionPlan::ReceiveStock => (MovementType::In, 1),
            _ => (MovementType::Out, -1),
        };
        let reason = transition_reason(order_id, plan).unwrap_or_default();

        for line in &lines {
            inventory::adjust(unit, line.product_id, sign * line.quantity, FloorPolicy::Clamp)
                .await?;
            let id = ledger::record(
                unit,
                NewStockMovement {
                    product_id: line.product_id,
                    movement_type,
                    quantity: line.quantity,
                    reason: reason.clone(),
                    reference_id: Some(order_id),
                    reference_type: ReferenceType::Order,
                },
            )
            .await?;
            movements.push(id);
        }
    }

    unit.write_order_status(order_id, requested).await?;

    Ok(TransitionOutcome::Updated {
        from: current,
        to: requested,
        movements,
    })
}
