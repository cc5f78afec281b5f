use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::repository::RepoError;

/// ApiError
///
/// The error taxonomy shared by every service and handler. Each variant maps to
/// exactly one HTTP status and is rendered as a `{"message": ...}` JSON body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No credential was presented.
    #[error("{0}")]
    Unauthenticated(String),
    /// A credential was presented but is invalid, or the caller is not the owner.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Missing or malformed required fields.
    #[error("{0}")]
    InvalidInput(String),
    /// Storage or unexpected failure. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::InvalidInput(msg) => msg,
            ApiError::Internal(_) => "Internal server error",
        }
    }

    pub fn not_owner() -> Self {
        ApiError::Forbidden("Unauthorized".to_string())
    }

    pub fn article_not_found() -> Self {
        ApiError::NotFound("Article not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(detail) => tracing::error!(%status, "request failed: {}", detail),
            other => tracing::debug!(%status, "request rejected: {}", other),
        }

        let body = Json(json!({ "message": self.public_message() }));
        (status, body).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// Malformed bodies and query strings are input errors, reported in the same envelope.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}
