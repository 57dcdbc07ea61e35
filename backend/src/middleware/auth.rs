//! Authentication middleware
//!
//! JWT authentication and the admin gate

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use shared::Role;

use crate::error::AppError;
use crate::services::auth::verify_token;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Validate the bearer token and attach the user to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::MissingToken)?;

    let claims = verify_token(&state.config.jwt.secret, token)?;

    let user_id = claims.sub.parse::<i64>().map_err(|_| AppError::InvalidToken)?;
    let role = claims.role().ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
        role,
    });

    Ok(next.run(request).await)
}

/// Reject authenticated users without the admin role
///
/// Must run after `auth_middleware`.
pub async fn admin_only(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AppError::MissingToken)?;

    if !user.is_admin() {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Admin route refused");
        return Err(AppError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::MissingToken)
    }
}
