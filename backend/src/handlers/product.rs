//! HTTP handlers for the product catalog

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use shared::{CreateProductInput, UpdateProductInput};

use crate::error::AppResult;
use crate::services::product::{Product, ProductService};
use crate::AppState;

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Product>> {
    let Path(product_id) = path?;
    let service = ProductService::new(state.db);
    Ok(Json(service.get(product_id).await?))
}

/// Create a product with its opening stock
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProductInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Json(input) = body?;
    let draft = input.parse()?;

    let service = ProductService::new(state.db);
    let product = service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateProductInput>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Path(product_id) = path?;
    let Json(input) = body?;
    let update = input.parse()?;

    let service = ProductService::new(state.db);
    Ok(Json(service.update(product_id, update).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(product_id) = path?;
    let service = ProductService::new(state.db);
    service.delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
