use axum::{extract::State, http::StatusCode};
use serde_json::json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /v1/healthcheck. Answers 503 while the store is unreachable.
pub async fn healthcheck(State(state): State<AppState>) -> ApiResult {
    let (status, availability, database) = match state.db.health_check().await {
        Ok(()) => (StatusCode::OK, "available", "ok"),
        Err(e) => {
            tracing::warn!("healthcheck: database unavailable: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };

    ApiResponse::ok()
        .with_status(status)
        .with("status", availability)?
        .with(
            "system_info",
            json!({
                "environment": state.config.environment.as_str(),
                "version": env!("CARGO_PKG_VERSION"),
            }),
        )?
        .with("database", database)
}
