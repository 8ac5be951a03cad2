use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::filter::Filters;
use crate::validator::Validator;

/// Parse a path id. Anything that is not a positive integer is a 404.
pub fn read_id_param(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::not_found()),
    }
}

/// Unwrap a JSON body, mapping extractor rejections onto the error envelope.
pub fn read_json<T>(payload: Result<Json<T>, JsonRejection>, limit_bytes: usize) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::payload_too_large(limit_bytes))
        }
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

/// Integer query parameter. Missing or blank yields the default; anything
/// unparsable records a field error and yields the default.
pub fn read_int(params: &HashMap<String, String>, key: &str, default: i64, v: &mut Validator) -> i64 {
    match params.get(key).map(|s| s.trim()) {
        None | Some("") => default,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer value");
                default
            }
        },
    }
}

pub fn read_string(params: &HashMap<String, String>, key: &str, default: &str) -> String {
    match params.get(key) {
        Some(s) if !s.is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

/// Build list filters from the query string. Range and safe-list checks are
/// left to `validate_filters`.
pub fn read_filters(
    params: &HashMap<String, String>,
    sort_safe_list: &'static [&'static str],
    v: &mut Validator,
) -> Filters {
    Filters {
        page: read_int(params, "page", Filters::DEFAULT_PAGE, v),
        page_size: read_int(params, "page_size", Filters::DEFAULT_PAGE_SIZE, v),
        sort: read_string(params, "sort", Filters::DEFAULT_SORT),
        sort_safe_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn id_must_be_positive_integer() {
        assert_eq!(read_id_param("42").unwrap(), 42);
        assert!(matches!(read_id_param("0"), Err(ApiError::NotFound(_))));
        assert!(matches!(read_id_param("-3"), Err(ApiError::NotFound(_))));
        assert!(matches!(read_id_param("abc"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn filters_fall_back_to_defaults() {
        let mut v = Validator::new();
        let filters = read_filters(&params(&[]), &["id", "-id"], &mut v);
        assert!(v.is_empty());
        assert_eq!(filters.page, 1);
        assert_eq!(filters.page_size, 10);
        assert_eq!(filters.sort, "id");
    }

    #[test]
    fn non_integer_page_is_a_field_error() {
        let mut v = Validator::new();
        let filters = read_filters(&params(&[("page", "two"), ("page_size", "5")]), &["id"], &mut v);
        assert_eq!(v.errors().get("page").map(String::as_str), Some("must be an integer value"));
        assert_eq!(filters.page_size, 5);
    }
}
