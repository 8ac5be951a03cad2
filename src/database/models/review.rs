use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use std::collections::HashMap;

use crate::database::resource::Resource;
use crate::filter::Condition;
use crate::validator::Validator;

/// A review of a catalog item. `product_id` is the id of the reviewed item and
/// always comes from the request path, never from the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub content: String,
    pub author: String,
    pub rating: i32,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReview {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub helpful_count: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewPatch {
    pub content: Option<String>,
    pub author: Option<String>,
    pub rating: Option<i32>,
    pub helpful_count: Option<i32>,
}

impl Resource for Review {
    type Create = NewReview;
    type Patch = ReviewPatch;

    const TABLE: &'static str = "reviews";
    const SINGULAR: &'static str = "review";
    const PLURAL: &'static str = "reviews";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_id",
        "content",
        "author",
        "rating",
        "helpful_count",
        "created_at",
        "version",
    ];
    const WRITABLE: &'static [&'static str] =
        &["product_id", "content", "author", "rating", "helpful_count"];
    const SORT_SAFE_LIST: &'static [&'static str] = &[
        "id",
        "author",
        "rating",
        "helpful_count",
        "-id",
        "-author",
        "-rating",
        "-helpful_count",
    ];
    const SEARCH_COLUMNS: &'static [&'static str] = &["content", "author"];

    fn from_input(input: NewReview) -> Self {
        Self {
            content: input.content,
            author: input.author,
            rating: input.rating,
            helpful_count: input.helpful_count,
            ..Self::default()
        }
    }

    fn apply_patch(&mut self, patch: ReviewPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(helpful_count) = patch.helpful_count {
            self.helpful_count = helpful_count;
        }
    }

    // Rating is stored as given; the 1-5 range is a client convention.
    fn validate(&self, v: &mut Validator) {
        v.check(!self.content.is_empty(), "content", "must be provided");
        v.check(!self.author.is_empty(), "author", "must be provided");
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn writable_values(&self) -> Vec<Value> {
        vec![
            json!(self.product_id),
            json!(self.content),
            json!(self.author),
            json!(self.rating),
            json!(self.helpful_count),
        ]
    }

    fn list_conditions(params: &HashMap<String, String>, v: &mut Validator) -> Vec<Condition> {
        let mut conditions: Vec<Condition> = Self::SEARCH_COLUMNS
            .iter()
            .map(|column| Condition::Contains {
                column: *column,
                term: params.get(*column).cloned().unwrap_or_default(),
            })
            .collect();

        let rating = match params.get("rating").map(|s| s.trim()) {
            None | Some("") => 0,
            Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
                v.add_error("rating", "must be an integer value");
                0
            }),
        };
        conditions.push(Condition::EqualsOrAny { column: "rating", value: rating });
        conditions
    }
}
