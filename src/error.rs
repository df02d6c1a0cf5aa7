//! Error types for BookFinder server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    StorageFailure = 3,
    NoSuchShelf = 4,
    NoSuchData = 5,
    Forbidden = 6,
    BadValue = 7,
    CatalogFailure = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Shelf not found: {0}")]
    ShelfNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body.
///
/// `error` always carries the human readable message so that clients can
/// detect failures by the presence of the field alone.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub kind: String,
    pub error: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone()),
            AppError::ShelfNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorCode::NoSuchShelf,
                "Bookshelf not found".to_string(),
            ),
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StorageFailure,
                    "Storage error".to_string(),
                )
            }
            AppError::Http(e) => {
                tracing::error!("Catalog transport error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorCode::CatalogFailure,
                    "Catalog service unavailable".to_string(),
                )
            }
            AppError::Upstream { status, message } => {
                let status = match *status {
                    401 => StatusCode::UNAUTHORIZED,
                    403 => StatusCode::FORBIDDEN,
                    404 => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, ErrorCode::CatalogFailure, message.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            code: code as u32,
            kind: format!("{:?}", code),
            error: message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(format!("Corrupted document: {}", e))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shelf_not_found_message() {
        let (status, code, message) = AppError::ShelfNotFound("9".into()).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, ErrorCode::NoSuchShelf);
        assert_eq!(message, "Bookshelf not found");
    }

    #[test]
    fn test_upstream_status_mapping() {
        let err = AppError::Upstream {
            status: 401,
            message: "Invalid Credentials".into(),
        };
        assert_eq!(err.parts().0, StatusCode::UNAUTHORIZED);

        let err = AppError::Upstream {
            status: 503,
            message: "Backend Error".into(),
        };
        assert_eq!(err.parts().0, StatusCode::BAD_GATEWAY);
    }
}
