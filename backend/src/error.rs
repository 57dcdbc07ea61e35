//! Error handling for the warehouse inventory backend
//!
//! Every failure path maps to one variant here and one JSON error body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{InputError, StockError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing token")]
    MissingToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Stock rules
    #[error("Insufficient stock for product {product_id}: {available} on hand, {requested} requested")]
    InsufficientStock {
        product_id: i64,
        available: i32,
        requested: i32,
    },

    // Persistence errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Attach the product to a stock rule violation
    pub fn from_stock(product_id: i64, err: StockError) -> Self {
        match err {
            StockError::InsufficientStock {
                available,
                requested,
            } => AppError::InsufficientStock {
                product_id,
                available,
                requested,
            },
            StockError::Overflow => AppError::ValidationError(format!(
                "Quantity for product {} would overflow",
                product_id
            )),
        }
    }

    /// True for failures raised by the persistence layer
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::StorageFailure(_))
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        InputError::from(errors).into()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid credentials"),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid or expired token"),
            ),
            AppError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", "No token provided"),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new("INSUFFICIENT_PERMISSIONS", "Admin access required"),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message: message.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InsufficientStock {
                product_id,
                available,
                requested,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message: format!(
                        "Insufficient stock for product {}: {} on hand, {} requested",
                        product_id, available, requested
                    ),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::DatabaseError(_) | AppError::StorageFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("STORAGE_FAILURE", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_stock_error_keeps_product() {
        let err = AppError::from_stock(
            9,
            StockError::InsufficientStock {
                available: 2,
                requested: 5,
            },
        );
        assert!(matches!(
            err,
            AppError::InsufficientStock {
                product_id: 9,
                available: 2,
                requested: 5
            }
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("Order 1".into()), StatusCode::NOT_FOUND),
            (
                AppError::Validation {
                    field: "status".into(),
                    message: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::InsufficientStock {
                    product_id: 1,
                    available: 0,
                    requested: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::StorageFailure("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::MissingToken, StatusCode::UNAUTHORIZED),
            (AppError::InsufficientPermissions, StatusCode::FORBIDDEN),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_insufficient_stock_reports_quantities() {
        let response = AppError::InsufficientStock {
            product_id: 3,
            available: 2,
            requested: 5,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["error"]["field"], "quantity");
        assert_eq!(
            body["error"]["message"],
            "Insufficient stock for product 3: 2 on hand, 5 requested"
        );
    }
}
