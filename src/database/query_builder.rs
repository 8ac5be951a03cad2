use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow};
use std::marker::PhantomData;

use crate::database::resource::Resource;
use crate::filter::{Condition, FilterError, FilterOrder, FilterWhere, Filters, SqlResult};

/// Renders the parameterized statements the repository runs for `T`.
pub struct QueryBuilder<T> {
    scope: Option<(&'static str, i64)>,
    _phantom: PhantomData<T>,
}

impl<T: Resource> QueryBuilder<T> {
    pub fn new(scope: Option<(&'static str, i64)>) -> Self {
        Self {
            scope,
            _phantom: PhantomData,
        }
    }

    pub fn insert(&self, record: &T) -> SqlResult {
        let placeholders = (1..=T::WRITABLE.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
            T::TABLE,
            quote_columns(T::WRITABLE),
            placeholders,
            quote_columns(T::COLUMNS),
        );
        SqlResult { query, params: record.writable_values() }
    }

    pub fn select_by_id(&self, id: i64) -> SqlResult {
        let (where_clause, params) = self.id_clause(id, 0);
        let query = format!(
            "SELECT {} FROM \"{}\" WHERE {}",
            quote_columns(T::COLUMNS),
            T::TABLE,
            where_clause,
        );
        SqlResult { query, params }
    }

    pub fn update(&self, record: &T) -> SqlResult {
        let mut params = record.writable_values();
        let assignments = T::WRITABLE
            .iter()
            .enumerate()
            .map(|(i, column)| format!("\"{}\" = ${}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let (where_clause, id_params) = self.id_clause(record.id(), params.len());
        params.extend(id_params);
        let query = format!(
            "UPDATE \"{}\" SET {}, \"version\" = \"version\" + 1 WHERE {} RETURNING {}",
            T::TABLE,
            assignments,
            where_clause,
            quote_columns(T::COLUMNS),
        );
        SqlResult { query, params }
    }

    pub fn delete(&self, id: i64) -> SqlResult {
        let (where_clause, params) = self.id_clause(id, 0);
        let query = format!("DELETE FROM \"{}\" WHERE {}", T::TABLE, where_clause);
        SqlResult { query, params }
    }

    /// Page query with a `total_records` window count on every row.
    pub fn list(&self, conditions: &[Condition], filters: &Filters) -> Result<SqlResult, FilterError> {
        let mut all = Vec::with_capacity(conditions.len() + 1);
        if let Some((column, value)) = self.scope {
            all.push(Condition::Equals { column, value });
        }
        all.extend_from_slice(conditions);

        let order_clause = FilterOrder::generate(filters)?;
        let (where_clause, mut params) = FilterWhere::generate(&all, 0)?;
        let limit_index = params.len() + 1;
        params.push(Value::from(filters.limit()));
        params.push(Value::from(filters.offset()));

        let query = format!(
            "SELECT COUNT(*) OVER() AS total_records, {} FROM \"{}\" WHERE {} {} LIMIT ${} OFFSET ${}",
            quote_columns(T::COLUMNS),
            T::TABLE,
            where_clause,
            order_clause,
            limit_index,
            limit_index + 1,
        );
        Ok(SqlResult { query, params })
    }

    fn id_clause(&self, id: i64, starting_param_index: usize) -> (String, Vec<Value>) {
        let mut clause = format!("\"id\" = ${}", starting_param_index + 1);
        let mut params = vec![Value::from(id)];
        if let Some((column, value)) = self.scope {
            clause.push_str(&format!(" AND \"{}\" = ${}", column, starting_param_index + 2));
            params.push(Value::from(value));
        }
        (clause, params)
    }
}

fn quote_columns(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Book, Review};
    use serde_json::json;

    #[test]
    fn insert_returns_every_column() {
        let book = Book {
            title: "Dune".into(),
            author: "Herbert".into(),
            genre: "SF".into(),
            ..Book::default()
        };
        let sql = QueryBuilder::<Book>::new(None).insert(&book);
        assert_eq!(
            sql.query,
            "INSERT INTO \"books\" (\"title\", \"author\", \"genre\", \"average_rating\") VALUES ($1, $2, $3, $4) \
             RETURNING \"id\", \"title\", \"author\", \"genre\", \"average_rating\", \"created_at\", \"version\""
        );
        assert_eq!(sql.params[..3], [json!("Dune"), json!("Herbert"), json!("SF")]);
    }

    #[test]
    fn update_bumps_version_and_binds_id_last() {
        let book = Book { id: 42, title: "T".into(), author: "A".into(), ..Book::default() };
        let sql = QueryBuilder::<Book>::new(None).update(&book);
        assert!(sql.query.contains("\"version\" = \"version\" + 1 WHERE \"id\" = $5 RETURNING"));
        assert_eq!(sql.params.last(), Some(&json!(42)));
    }

    #[test]
    fn scoped_statements_match_parent() {
        let builder = QueryBuilder::<Review>::new(Some(("product_id", 9)));
        let sql = builder.select_by_id(3);
        assert!(sql.query.ends_with("WHERE \"id\" = $1 AND \"product_id\" = $2"));
        assert_eq!(sql.params, vec![json!(3), json!(9)]);

        let sql = builder.delete(3);
        assert_eq!(sql.query, "DELETE FROM \"reviews\" WHERE \"id\" = $1 AND \"product_id\" = $2");
    }

    #[test]
    fn list_places_limit_after_conditions() {
        let mut filters = Filters::new(Book::SORT_SAFE_LIST);
        filters.page = 3;
        filters.page_size = 20;
        filters.sort = "-title".into();
        let conditions = vec![
            Condition::Contains { column: "title", term: "dune".into() },
            Condition::Contains { column: "author", term: String::new() },
        ];
        let sql = QueryBuilder::<Book>::new(None).list(&conditions, &filters).unwrap();
        assert!(sql.query.starts_with("SELECT COUNT(*) OVER() AS total_records, \"id\""));
        assert!(sql.query.ends_with("ORDER BY \"title\" DESC, \"id\" ASC LIMIT $3 OFFSET $4"));
        assert_eq!(sql.params, vec![json!("dune"), json!(""), json!(20), json!(40)]);
    }

    #[test]
    fn list_refuses_unvalidated_sort() {
        let mut filters = Filters::new(Book::SORT_SAFE_LIST);
        filters.sort = "genre; --".into();
        assert!(QueryBuilder::<Book>::new(None).list(&[], &filters).is_err());
    }
}
