use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::{AuthError, Claims, TokenVerifier};
use crate::error::ApiError;

/// Bearer-token gate for the resource routes. Verified claims are inserted into
/// the request extensions for handlers that want them.
pub async fn require_token(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match authenticate(verifier.as_ref(), request.headers()).await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("rejected request: {}", e);
            return ApiError::unauthorized("invalid or missing authentication token").into_response();
        }
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

async fn authenticate(verifier: &dyn TokenVerifier, headers: &HeaderMap) -> Result<Claims, AuthError> {
    let token = extract_bearer(headers).ok_or(AuthError::MissingToken)?;
    verifier.verify(token).await
}

/// Extract the token from `Authorization: Bearer <token>`.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn rejects_other_schemes_and_blank_tokens() {
        assert_eq!(extract_bearer(&headers("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
