//! Reviews nested under a parent item, e.g. `/v1/books/:id/reviews`.
//! Every statement is scoped to the parent id taken from the path.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use std::collections::HashMap;

use crate::app::AppState;
use crate::database::models::{NewReview, Review, ReviewPatch};
use crate::database::{DatabaseManager, Repository, Resource};
use crate::error::ApiError;
use crate::filter::validate_filters;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validator::Validator;

use super::utils::{read_filters, read_id_param, read_json};

const SCOPE_COLUMN: &str = "product_id";

/// Resolve the parent id and confirm the parent exists.
async fn parent_id<P: Resource>(db: &DatabaseManager, raw: &str) -> Result<i64, ApiError> {
    let id = read_id_param(raw)?;
    if !Repository::<P>::new(db.clone()).exists(id).await? {
        return Err(ApiError::not_found());
    }
    Ok(id)
}

fn scoped(db: &DatabaseManager, parent: i64) -> Repository<Review> {
    Repository::scoped(db.clone(), SCOPE_COLUMN, parent)
}

/// POST /v1/{parent}/:id/reviews
pub async fn create<P: Resource>(
    State(state): State<AppState>,
    Path(parent): Path<String>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult {
    let parent = parent_id::<P>(&state.db, &parent).await?;
    let input = read_json(payload, state.config.api.max_request_size_bytes)?;

    let mut review = Review::from_input(input);
    review.product_id = parent;

    let mut v = Validator::new();
    review.validate(&mut v);
    if !v.is_empty() {
        return Err(v.into());
    }

    let review = scoped(&state.db, parent).insert(&review).await?;
    tracing::info!(parent = P::SINGULAR, parent_id = parent, id = review.id, "created review");

    ApiResponse::created(format!("/v1/{}/{}/reviews/{}", P::PLURAL, parent, review.id))
        .with(Review::SINGULAR, &review)
}

/// GET /v1/{parent}/:id/reviews/:review_id
pub async fn show<P: Resource>(
    State(state): State<AppState>,
    Path((parent, id)): Path<(String, String)>,
) -> ApiResult {
    let parent = parent_id::<P>(&state.db, &parent).await?;
    let id = read_id_param(&id)?;
    let review = scoped(&state.db, parent).get(id).await?;
    ApiResponse::ok().with(Review::SINGULAR, &review)
}

/// PATCH /v1/{parent}/:id/reviews/:review_id. The parent link cannot be changed.
pub async fn update<P: Resource>(
    State(state): State<AppState>,
    Path((parent, id)): Path<(String, String)>,
    payload: Result<Json<ReviewPatch>, JsonRejection>,
) -> ApiResult {
    let parent = parent_id::<P>(&state.db, &parent).await?;
    let id = read_id_param(&id)?;
    let repo = scoped(&state.db, parent);
    let mut review = repo.get(id).await?;

    let patch = read_json(payload, state.config.api.max_request_size_bytes)?;
    review.apply_patch(patch);

    let mut v = Validator::new();
    review.validate(&mut v);
    if !v.is_empty() {
        return Err(v.into());
    }

    let review = repo.update(&review).await?;
    ApiResponse::ok().with(Review::SINGULAR, &review)
}

/// DELETE /v1/{parent}/:id/reviews/:review_id
pub async fn delete<P: Resource>(
    State(state): State<AppState>,
    Path((parent, id)): Path<(String, String)>,
) -> ApiResult {
    let parent = parent_id::<P>(&state.db, &parent).await?;
    let id = read_id_param(&id)?;
    scoped(&state.db, parent).delete(id).await?;
    Ok(ApiResponse::message(format!("{} successfully deleted", Review::SINGULAR)))
}

/// GET /v1/{parent}/:id/reviews
pub async fn list<P: Resource>(
    State(state): State<AppState>,
    Path(parent): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let parent = parent_id::<P>(&state.db, &parent).await?;

    let mut v = Validator::new();
    let filters = read_filters(&params, Review::SORT_SAFE_LIST, &mut v);
    let conditions = Review::list_conditions(&params, &mut v);
    validate_filters(&mut v, &filters);
    if !v.is_empty() {
        return Err(v.into());
    }

    let (reviews, metadata) = scoped(&state.db, parent).list(&conditions, &filters).await?;
    ApiResponse::ok().with(Review::PLURAL, &reviews)?.with("metadata", &metadata)
}
