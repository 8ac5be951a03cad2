use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::validator::Validator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub average_rating: f32,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl Resource for Book {
    type Create = NewBook;
    type Patch = BookPatch;

    const TABLE: &'static str = "books";
    const SINGULAR: &'static str = "book";
    const PLURAL: &'static str = "books";
    const COLUMNS: &'static [&'static str] =
        &["id", "title", "author", "genre", "average_rating", "created_at", "version"];
    const WRITABLE: &'static [&'static str] = &["title", "author", "genre", "average_rating"];
    const SORT_SAFE_LIST: &'static [&'static str] = &["id", "title", "author", "-id", "-title", "-author"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["title", "author"];

    fn from_input(input: NewBook) -> Self {
        Self {
            title: input.title,
            author: input.author,
            genre: input.genre,
            ..Self::default()
        }
    }

    fn apply_patch(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
    }

    fn validate(&self, v: &mut Validator) {
        v.check(!self.title.is_empty(), "title", "must be provided");
        v.check(!self.author.is_empty(), "author", "must be provided");
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn writable_values(&self) -> Vec<Value> {
        vec![
            json!(self.title),
            json!(self.author),
            json!(self.genre),
            json!(f64::from(self.average_rating)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_author_are_required() {
        let book = Book::from_input(NewBook { title: String::new(), author: String::new(), genre: "G".into() });
        let mut v = Validator::new();
        book.validate(&mut v);
        assert_eq!(v.errors()["title"], "must be provided");
        assert_eq!(v.errors()["author"], "must be provided");
        assert!(!v.errors().contains_key("genre"));
    }

    #[test]
    fn patch_leaves_absent_fields_alone() {
        let mut book = Book { id: 1, title: "T".into(), author: "A".into(), genre: "G".into(), version: 1, ..Book::default() };
        book.apply_patch(BookPatch { title: Some("T2".into()), ..BookPatch::default() });
        assert_eq!(book.title, "T2");
        assert_eq!(book.author, "A");
        assert_eq!(book.genre, "G");
        assert_eq!(book.version, 1);
    }

    #[test]
    fn created_at_is_not_serialized() {
        let value = serde_json::to_value(Book::default()).unwrap();
        assert!(value.get("created_at").is_none());
        assert!(value.get("version").is_some());
    }

    #[test]
    fn unknown_body_fields_are_rejected() {
        let err = serde_json::from_str::<NewBook>(r#"{"title":"T","isbn":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
