// HTTP API Error Types
use axum::{
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::validator::Validator;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request (body could not be decoded)
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 422 Unprocessable Entity (one or more field rules failed)
    UnprocessableEntity { field_errors: HashMap<String, String> },

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::UnprocessableEntity { .. } => "validation failed",
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to the `{"error": ...}` envelope. Validation failures carry the
    /// field map in place of the message.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::UnprocessableEntity { field_errors } => json!({ "error": field_errors }),
            _ => json!({ "error": self.message() }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("the requested resource could not be found".to_string())
    }

    pub fn method_not_allowed() -> Self {
        ApiError::MethodNotAllowed("the method is not supported for this resource".to_string())
    }

    pub fn payload_too_large(limit_bytes: usize) -> Self {
        ApiError::PayloadTooLarge(format!("body must not be larger than {} bytes", limit_bytes))
    }

    pub fn failed_validation(field_errors: HashMap<String, String>) -> Self {
        ApiError::UnprocessableEntity { field_errors }
    }

    pub fn rate_limit_exceeded() -> Self {
        ApiError::TooManyRequests("rate limit exceeded".to_string())
    }

    /// Logs the underlying cause and returns a generic 500.
    pub fn server_error(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "server error");
        ApiError::InternalServerError(
            "the server encountered a problem and could not process your request".to_string(),
        )
    }
}

impl From<Validator> for ApiError {
    fn from(v: Validator) -> Self {
        ApiError::failed_validation(v.into_errors())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound => ApiError::not_found(),
            DatabaseError::UnsafeQuery(FilterError::UnsafeSort(sort)) => {
                // Handlers validate before listing, so reaching here is an internal bug.
                tracing::error!(sort = %sort, "unvalidated sort token reached the repository");
                ApiError::server_error(format!("unsafe sort parameter: {}", sort))
            }
            other => ApiError::server_error(other),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_field_map() {
        let mut v = Validator::new();
        v.check(false, "title", "must be provided");
        let err = ApiError::from(v);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_json(), json!({ "error": { "title": "must be provided" } }));
    }

    #[test]
    fn database_not_found_maps_to_404() {
        let err = ApiError::from(DatabaseError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json(), json!({ "error": "the requested resource could not be found" }));
    }

    #[test]
    fn unsafe_sort_is_a_server_error() {
        let err = ApiError::from(DatabaseError::UnsafeQuery(FilterError::UnsafeSort("secret_column".into())));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("secret_column"));
    }

    #[test]
    fn timeouts_are_server_errors() {
        let err = ApiError::from(DatabaseError::Timeout(std::time::Duration::from_secs(3)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
