use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The crate-wide error type for all endpoint failures. Each variant maps to one
/// HTTP status class, and every response body has the shape `{"error": "<message>"}`
/// so the web and mobile clients can surface failures uniformly.
///
/// Internal failures carry only a generic, endpoint-specific message; the underlying
/// storage or library error is logged at the boundary and never leaks to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/duplicate/malformed input. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// Missing credentials or failed login. Maps to 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Bad/expired token or insufficient role. Maps to 403.
    #[error("{0}")]
    Forbidden(String),

    /// Record does not exist. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// Storage or library failure, already logged. Maps to 500.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// storage
    ///
    /// Converts a repository failure into a generic 500. The database error is logged
    /// here, at the endpoint boundary; the client only sees `message`.
    pub fn storage(message: &str, err: sqlx::Error) -> Self {
        tracing::error!(error = ?err, "{message}");
        ApiError::Internal(message.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
