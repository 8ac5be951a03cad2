use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow};
use std::collections::HashMap;

use crate::filter::Condition;
use crate::validator::Validator;

/// A persisted record type served by the generic repository and handlers.
///
/// Every resource follows the same shape: `id`, `created_at` and `version` are
/// owned by the store, the `WRITABLE` columns are fully replaced on update.
pub trait Resource:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + Sized + 'static
{
    /// Request body for create.
    type Create: DeserializeOwned + Send + 'static;
    /// Request body for partial update; `None` fields are left unchanged.
    type Patch: DeserializeOwned + Send + 'static;

    const TABLE: &'static str;
    /// Envelope key for a single record, e.g. `"book"`.
    const SINGULAR: &'static str;
    /// Envelope key for a list, e.g. `"books"`.
    const PLURAL: &'static str;
    /// Every selected column, in `FromRow` order.
    const COLUMNS: &'static [&'static str];
    /// Columns written on insert and replaced on update.
    const WRITABLE: &'static [&'static str];
    const SORT_SAFE_LIST: &'static [&'static str];
    /// Text columns with a same-named query parameter for partial matching.
    const SEARCH_COLUMNS: &'static [&'static str];

    fn from_input(input: Self::Create) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Field rules checked before every insert and update.
    fn validate(&self, v: &mut Validator);

    fn id(&self) -> i64;

    /// Values for `WRITABLE`, in the same order.
    fn writable_values(&self) -> Vec<Value>;

    fn list_conditions(params: &HashMap<String, String>, _v: &mut Validator) -> Vec<Condition> {
        Self::SEARCH_COLUMNS
            .iter()
            .map(|column| Condition::Contains {
                column: *column,
                term: params.get(*column).cloned().unwrap_or_default(),
            })
            .collect()
    }
}
