//! Error types for the HTTP API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{DatabaseError, ValidationError};
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned from request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, unknown or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Login with an unknown email or a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Request body rejected by validation.
    #[error("{0}")]
    Validation(String),

    /// Conflicts with existing data.
    #[error("{0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(DatabaseError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Database(DatabaseError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            ApiError::Unauthorized => {
                warn!("Unauthorized request");
                self.to_string()
            }
            ApiError::InvalidCredentials => {
                warn!("Rejected login");
                self.to_string()
            }
            ApiError::Database(DatabaseError::Validation(err)) => err.to_string(),
            ApiError::Database(DatabaseError::AlreadyExists { entity, .. }) => {
                format!("{} already exists", entity)
            }
            ApiError::Database(err) => {
                error!("Database error: {}", err);
                "Internal server error".to_string()
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ApiError::Validation(msg) | ApiError::Conflict(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for request handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(ValidationError::NoBeneficiaries).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(DatabaseError::Validation(ValidationError::MissingMainWallet))
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(DatabaseError::AlreadyExists {
                entity: "User",
                id: "a@example.com".to_string(),
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Database(DatabaseError::NotFound {
                entity: "User",
                id: "x".to_string(),
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
