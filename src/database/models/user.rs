use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::validator::Validator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

const MAX_FULL_NAME_CHARS: usize = 100;

impl Resource for User {
    type Create = NewUser;
    type Patch = UserPatch;

    const TABLE: &'static str = "users";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "email", "full_name", "created_at", "version"];
    const WRITABLE: &'static [&'static str] = &["email", "full_name"];
    const SORT_SAFE_LIST: &'static [&'static str] =
        &["id", "email", "full_name", "-id", "-email", "-full_name"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["email", "full_name"];

    fn from_input(input: NewUser) -> Self {
        Self {
            email: input.email,
            full_name: input.full_name,
            ..Self::default()
        }
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
    }

    fn validate(&self, v: &mut Validator) {
        v.check(!self.email.is_empty(), "email", "must be provided");
        v.check(!self.full_name.is_empty(), "full_name", "must be provided");
        v.check(
            self.full_name.chars().count() <= MAX_FULL_NAME_CHARS,
            "full_name",
            "must not be more than 100 characters long",
        );
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn writable_values(&self) -> Vec<Value> {
        vec![json!(self.email), json!(self.full_name)]
    }
}
