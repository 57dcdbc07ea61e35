//! HTTP handlers for product categories

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use shared::CategoryInput;

use crate::error::AppResult;
use crate::services::category::{Category, CategoryService};
use crate::AppState;

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let Json(input) = body?;
    let draft = input.parse()?;

    let service = CategoryService::new(state.db);
    let category = service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(category_id) = path?;
    let service = CategoryService::new(state.db);
    service.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
