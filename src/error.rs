//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::random::RandomSourceError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    // Server errors (5xx)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Random source error: {0}")]
    RandomSource(#[from] RandomSourceError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 401 Unauthorized
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", None),
            AppError::Auth(auth_err) => match auth_err {
                AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token", None),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
                AuthError::SessionExpired => (StatusCode::UNAUTHORIZED, "session_expired", None),
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
                }
                AuthError::Password(e) => {
                    tracing::error!("Stored password hash unusable: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
                }
                AuthError::Store(e) => {
                    tracing::error!("Store error during authentication: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
                }
            },

            // 404 Not Found
            AppError::TransactionNotFound(id) => {
                (StatusCode::NOT_FOUND, "transaction_not_found", Some(id.clone()))
            }

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
            AppError::RandomSource(e) => {
                tracing::error!("Random source error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.parts();

        // Never leak store internals to the client
        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
