//! Generic CRUD handlers, instantiated once per resource in the router.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use std::collections::HashMap;

use crate::app::AppState;
use crate::database::{Repository, Resource};
use crate::filter::validate_filters;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validator::Validator;

use super::utils::{read_filters, read_id_param, read_json};

/// POST /v1/{resource}
pub async fn create<T: Resource>(
    State(state): State<AppState>,
    payload: Result<Json<T::Create>, JsonRejection>,
) -> ApiResult {
    let input = read_json(payload, state.config.api.max_request_size_bytes)?;
    let record = T::from_input(input);

    let mut v = Validator::new();
    record.validate(&mut v);
    if !v.is_empty() {
        return Err(v.into());
    }

    let record = Repository::<T>::new(state.db.clone()).insert(&record).await?;
    tracing::info!(table = T::TABLE, id = record.id(), "created record");

    ApiResponse::created(format!("/v1/{}/{}", T::PLURAL, record.id())).with(T::SINGULAR, &record)
}

/// GET /v1/{resource}/:id
pub async fn show<T: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = read_id_param(&id)?;
    let record = Repository::<T>::new(state.db.clone()).get(id).await?;
    ApiResponse::ok().with(T::SINGULAR, &record)
}

/// PATCH /v1/{resource}/:id. Absent fields keep their stored value.
pub async fn update<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<T::Patch>, JsonRejection>,
) -> ApiResult {
    let id = read_id_param(&id)?;
    let repo = Repository::<T>::new(state.db.clone());
    let mut record = repo.get(id).await?;

    let patch = read_json(payload, state.config.api.max_request_size_bytes)?;
    record.apply_patch(patch);

    let mut v = Validator::new();
    record.validate(&mut v);
    if !v.is_empty() {
        return Err(v.into());
    }

    let record = repo.update(&record).await?;
    ApiResponse::ok().with(T::SINGULAR, &record)
}

/// DELETE /v1/{resource}/:id
pub async fn delete<T: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = read_id_param(&id)?;
    Repository::<T>::new(state.db.clone()).delete(id).await?;
    tracing::info!(table = T::TABLE, id, "deleted record");
    Ok(ApiResponse::message(format!("{} successfully deleted", T::SINGULAR)))
}

/// GET /v1/{resource}?page=&page_size=&sort=&<search columns>
pub async fn list<T: Resource>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let mut v = Validator::new();
    let filters = read_filters(&params, T::SORT_SAFE_LIST, &mut v);
    let conditions = T::list_conditions(&params, &mut v);
    validate_filters(&mut v, &filters);
    if !v.is_empty() {
        return Err(v.into());
    }

    let (records, metadata) = Repository::<T>::new(state.db.clone())
        .list(&conditions, &filters)
        .await?;

    ApiResponse::ok().with(T::PLURAL, &records)?.with("metadata", &metadata)
}
