//! HTTP error mapping
//!
//! Store errors become JSON `{"error": ...}` bodies with the status codes
//! the dashboard frontend expects.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use phonebase_core::Error as StoreError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body was not valid JSON
    #[error("Malformed JSON body")]
    MalformedBody,

    /// Nothing stored at the requested path
    #[error("Not found")]
    NotFound,

    /// The path or operation was invalid for this store
    #[error("{0}")]
    BadRequest(String),

    /// Store-level failure (I/O, serialization)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::InvalidPath(e) => ApiError::BadRequest(e.to_string()),
            StoreError::TypeMismatch { .. } | StoreError::InvalidOperation(_) => {
                ApiError::BadRequest(e.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MalformedBody | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({"error": self.to_string()}));
        (status, body).into_response()
    }
}
