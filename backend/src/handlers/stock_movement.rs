//! HTTP handlers for the stock ledger

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::ManualAdjustmentInput;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock_adjustment::AdjustmentResponse;
use crate::services::{LedgerService, StockAdjustmentService};
use crate::store::StockMovement;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub product_id: Option<i64>,
}

/// Most recent stock movements, optionally for one product
pub async fn list_stock_movements(
    State(state): State<AppState>,
    query: Result<Query<MovementQuery>, QueryRejection>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let Query(query) = query?;
    let service = LedgerService::new(state.stock.clone(), state.config.ledger.page_size);
    Ok(Json(service.list(query.product_id).await?))
}

/// Record a manual stock adjustment
pub async fn create_stock_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: Result<Json<ManualAdjustmentInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AdjustmentResponse>)> {
    let Json(input) = body?;
    let adjustment = input.parse()?;

    tracing::debug!(user_id = current_user.0.user_id, "Manual adjustment requested");

    let service = StockAdjustmentService::new(state.stock.clone());
    let receipt = service.adjust(adjustment).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}
