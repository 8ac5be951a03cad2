use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Keyed JSON envelope for successful responses, e.g. `{"book": {...}}` or
/// `{"books": [...], "metadata": {...}}`.
#[derive(Debug)]
pub struct ApiResponse {
    envelope: Map<String, Value>,
    status: StatusCode,
    location: Option<String>,
}

impl ApiResponse {
    /// Empty 200 envelope
    pub fn ok() -> Self {
        Self {
            envelope: Map::new(),
            status: StatusCode::OK,
            location: None,
        }
    }

    /// 201 with a `Location` header pointing at the new resource
    pub fn created(location: impl Into<String>) -> Self {
        Self {
            envelope: Map::new(),
            status: StatusCode::CREATED,
            location: Some(location.into()),
        }
    }

    /// `{"message": ...}` with 200
    pub fn message(message: impl Into<String>) -> Self {
        let mut response = Self::ok();
        response.envelope.insert("message".to_string(), Value::String(message.into()));
        response
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a top-level key to the envelope.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value).map_err(ApiError::server_error)?;
        self.envelope.insert(key.to_string(), value);
        Ok(self)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.envelope
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(Value::Object(self.envelope))).into_response();

        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(e) => tracing::warn!("dropping invalid Location header {:?}: {}", location, e),
            }
        }

        response
    }
}

pub type ApiResult = Result<ApiResponse, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_keyed_envelope() {
        let response = ApiResponse::ok().with("book", json!({ "id": 1 })).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(Value::Object(response.body().clone()), json!({ "book": { "id": 1 } }));
    }

    #[test]
    fn created_sets_location_header() {
        let response = ApiResponse::created("/v1/books/7").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/v1/books/7");
    }

    #[test]
    fn message_envelope() {
        let response = ApiResponse::message("book successfully deleted");
        assert_eq!(
            Value::Object(response.body().clone()),
            json!({ "message": "book successfully deleted" })
        );
    }
}
