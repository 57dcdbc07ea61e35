//! Authentication handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use shared::LoginInput;

use crate::error::AppResult;
use crate::middleware::{AuthUser, CurrentUser};
use crate::services::auth::LoginResponse;
use crate::services::AuthService;
use crate::AppState;

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: AuthUser,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(input) = body?;
    let credentials = input.parse()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(credentials).await?;
    Ok(Json(response))
}

/// Token check for any signed-in role
pub async fn verify(current_user: CurrentUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user: current_user.0,
    })
}
