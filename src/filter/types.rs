use serde::{Deserialize, Serialize};

/// Pagination and sorting request for a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    /// Column name, optionally prefixed with `-` for descending order.
    pub sort: String,
    pub sort_safe_list: &'static [&'static str],
}

impl Filters {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_PAGE_SIZE: i64 = 10;
    pub const DEFAULT_SORT: &'static str = "id";

    pub fn new(sort_safe_list: &'static [&'static str]) -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
            sort: Self::DEFAULT_SORT.to_string(),
            sort_safe_list,
        }
    }
}

/// Page metadata returned alongside every list. Zero fields are omitted, so an
/// empty result serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A single WHERE condition on a list query.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive partial match. An empty term matches every row.
    Contains { column: &'static str, term: String },
    /// Integer equality where zero matches every row.
    EqualsOrAny { column: &'static str, value: i64 },
    /// Mandatory integer equality, used to scope nested resources.
    Equals { column: &'static str, value: i64 },
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
