use crate::validator::{permitted_value, Validator};

use super::error::FilterError;
use super::types::{Filters, Metadata, SortDirection};

pub const MAX_PAGE: i64 = 500;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Check page bounds and the sort token against the endpoint's allow-list.
pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must not exceed 500");
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(f.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
    v.check(
        permitted_value(&f.sort.as_str(), f.sort_safe_list),
        "sort",
        "invalid sort value",
    );
}

impl Filters {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Column to sort on. The token is checked against the allow-list again here
    /// because it ends up interpolated into SQL.
    pub fn sort_column(&self) -> Result<&str, FilterError> {
        if !self.sort_safe_list.iter().any(|safe| *safe == self.sort) {
            return Err(FilterError::UnsafeSort(self.sort.clone()));
        }
        Ok(self.sort.strip_prefix('-').unwrap_or(&self.sort))
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

pub fn calculate_metadata(total_records: i64, current_page: i64, page_size: i64) -> Metadata {
    if total_records == 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFE: &[&str] = &["id", "title", "author", "-id", "-title", "-author"];

    fn filters(page: i64, page_size: i64, sort: &str) -> Filters {
        Filters {
            page,
            page_size,
            sort: sort.to_string(),
            sort_safe_list: SAFE,
        }
    }

    fn errors_for(f: &Filters) -> Validator {
        let mut v = Validator::new();
        validate_filters(&mut v, f);
        v
    }

    #[test]
    fn accepts_bounds_and_derives_limit_offset() {
        for (page, page_size) in [(1, 1), (1, 100), (500, 1), (500, 100), (3, 20)] {
            let f = filters(page, page_size, "id");
            assert!(errors_for(&f).is_empty(), "page={} page_size={}", page, page_size);
            assert_eq!(f.limit(), page_size);
            assert_eq!(f.offset(), (page - 1) * page_size);
        }
    }

    #[test]
    fn rejects_out_of_range_page() {
        let v = errors_for(&filters(0, 10, "id"));
        assert_eq!(v.errors()["page"], "must be greater than zero");

        let v = errors_for(&filters(501, 10, "id"));
        assert_eq!(v.errors()["page"], "must not exceed 500");
    }

    #[test]
    fn rejects_out_of_range_page_size() {
        let v = errors_for(&filters(1, 0, "id"));
        assert_eq!(v.errors()["page_size"], "must be greater than zero");

        let v = errors_for(&filters(1, 101, "id"));
        assert_eq!(v.errors()["page_size"], "must be a maximum of 100");
    }

    #[test]
    fn rejects_sort_outside_safe_list() {
        for sort in ["bogus", "Title", "--title", "title; DROP TABLE books", ""] {
            let v = errors_for(&filters(1, 10, sort));
            assert_eq!(v.errors()["sort"], "invalid sort value", "sort={:?}", sort);
        }
    }

    #[test]
    fn descending_sort_strips_prefix() {
        let f = filters(1, 10, "-title");
        assert_eq!(f.sort_column(), Ok("title"));
        assert_eq!(f.sort_direction(), SortDirection::Desc);

        let f = filters(1, 10, "author");
        assert_eq!(f.sort_column(), Ok("author"));
        assert_eq!(f.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn sort_column_fails_closed_without_validation() {
        let f = filters(1, 10, "password");
        assert_eq!(
            f.sort_column(),
            Err(FilterError::UnsafeSort("password".to_string()))
        );
    }

    #[test]
    fn metadata_is_zero_without_records() {
        assert_eq!(calculate_metadata(0, 7, 25), Metadata::default());
        assert_eq!(serde_json::to_value(calculate_metadata(0, 1, 10)).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn metadata_rounds_last_page_up() {
        let m = calculate_metadata(95, 2, 10);
        assert_eq!(m.first_page, 1);
        assert_eq!(m.last_page, 10);
        assert_eq!(m.current_page, 2);
        assert_eq!(m.page_size, 10);
        assert_eq!(m.total_records, 95);

        assert_eq!(calculate_metadata(100, 1, 10).last_page, 10);
        assert_eq!(calculate_metadata(1, 1, 100).last_page, 1);
    }
}
