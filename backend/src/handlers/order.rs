//! HTTP handlers for purchase orders

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use shared::{CreateOrderInput, StatusChangeInput};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::{Order, OrderCreated, OrderService, OrderWithItems};
use crate::services::order_status::TransitionResponse;
use crate::services::OrderStatusService;
use crate::AppState;

pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<OrderWithItems>> {
    let Path(order_id) = path?;
    let service = OrderService::new(state.db);
    Ok(Json(service.get(order_id).await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<CreateOrderInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<OrderCreated>)> {
    let Json(input) = body?;
    let draft = input.parse()?;

    let service = OrderService::new(state.db);
    let created = service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Move an order to a new status and apply its stock effect
pub async fn update_order_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<StatusChangeInput>, JsonRejection>,
) -> AppResult<Json<TransitionResponse>> {
    let Path(order_id) = path?;
    let Json(input) = body?;
    let requested = input.parse()?;

    tracing::debug!(
        order_id,
        user_id = current_user.0.user_id,
        requested = %requested,
        "Status change requested"
    );

    let service = OrderStatusService::new(state.stock.clone());
    let outcome = service.transition(order_id, requested).await?;
    Ok(Json(outcome.into()))
}

pub async fn delete_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(order_id) = path?;
    let service = OrderService::new(state.db);
    service.delete(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
