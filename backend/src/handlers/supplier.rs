//! HTTP handlers for suppliers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use shared::SupplierInput;

use crate::error::AppResult;
use crate::services::supplier::{Supplier, SupplierService};
use crate::AppState;

pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Supplier>> {
    let Path(supplier_id) = path?;
    let service = SupplierService::new(state.db);
    Ok(Json(service.get(supplier_id).await?))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    body: Result<Json<SupplierInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let Json(input) = body?;
    let draft = input.parse()?;

    let service = SupplierService::new(state.db);
    let supplier = service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<SupplierInput>, JsonRejection>,
) -> AppResult<Json<Supplier>> {
    let Path(supplier_id) = path?;
    let Json(input) = body?;
    let draft = input.parse()?;

    let service = SupplierService::new(state.db);
    Ok(Json(service.update(supplier_id, draft).await?))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(supplier_id) = path?;
    let service = SupplierService::new(state.db);
    service.delete(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
