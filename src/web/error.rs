use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::query::QueryError;

/// One field-level validation failure.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: &str, message: &str) -> Self {
        Self {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

/// Error surface of the HTTP API. Every variant renders as the
/// `{"status": "error", ...}` envelope.
#[derive(Debug)]
pub enum ApiError {
    /// Request payload failed validation; all field errors are reported.
    Validation(Vec<FieldError>),
    NotFound(String),
    BadRequest(String),
    /// Database or other internal failure. The message is the client-facing
    /// summary; the cause is logged where it happens.
    Internal(String),
    Query(QueryError),
}

impl ApiError {
    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound(message.to_string())
    }

    pub fn internal(message: &str) -> Self {
        ApiError::Internal(message.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Gate rejections are the client's problem, infrastructure
            // failures are ours.
            ApiError::Query(e) => match e {
                QueryError::NoSqlFound
                | QueryError::EmptyQuery
                | QueryError::NotSelect
                | QueryError::ForbiddenKeyword(_) => StatusCode::BAD_REQUEST,
                QueryError::ExecutionFailed(_) | QueryError::ServiceUnavailable(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation(errors) => json!({
                "status": "error",
                "message": "Validation failed",
                "errors": errors,
            }),
            ApiError::Query(e) => json!({
                "status": "error",
                "message": e.to_string(),
                "kind": e.kind(),
            }),
            ApiError::NotFound(message)
            | ApiError::BadRequest(message)
            | ApiError::Internal(message) => json!({
                "status": "error",
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        ApiError::Query(e)
    }
}
