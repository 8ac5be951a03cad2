// handlers/mod.rs - route handlers
//
// resource: generic create/show/update/delete/list for any `Resource`
// reviews:  the same operations for reviews nested under a parent item
// health:   service and store availability

pub mod health;
pub mod resource;
pub mod reviews;
pub mod utils;

pub use health::healthcheck;

use crate::error::ApiError;

/// Fallback for unmatched paths
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}
