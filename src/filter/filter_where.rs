use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::types::Condition;

/// Renders list conditions into a parameterized WHERE clause.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause (without the `WHERE` keyword) and its bind values.
    /// Placeholders are numbered from `starting_param_index + 1`.
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> Result<String, FilterError> {
        match condition {
            Condition::Contains { column, term } => {
                FilterOrder::validate_column(column)?;
                let p = self.push(Value::String(term.clone()));
                Ok(format!("(\"{}\" ILIKE '%' || {} || '%' OR {} = '')", column, p, p))
            }
            Condition::EqualsOrAny { column, value } => {
                FilterOrder::validate_column(column)?;
                let p = self.push(Value::from(*value));
                Ok(format!("(\"{}\" = {} OR {} = 0)", column, p, p))
            }
            Condition::Equals { column, value } => {
                FilterOrder::validate_column(column)?;
                let p = self.push(Value::from(*value));
                Ok(format!("\"{}\" = {}", column, p))
            }
        }
    }

    fn push(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_conditions_match_everything() {
        let (sql, params) = FilterWhere::generate(&[], 0).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn numbers_placeholders_in_order() {
        let conditions = vec![
            Condition::Equals { column: "product_id", value: 7 },
            Condition::Contains { column: "content", term: "great".to_string() },
            Condition::EqualsOrAny { column: "rating", value: 0 },
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(
            sql,
            "\"product_id\" = $1 AND (\"content\" ILIKE '%' || $2 || '%' OR $2 = '') AND (\"rating\" = $3 OR $3 = 0)"
        );
        assert_eq!(params, vec![json!(7), json!("great"), json!(0)]);
    }

    #[test]
    fn respects_starting_index() {
        let conditions = vec![Condition::Contains { column: "title", term: String::new() }];
        let (sql, _) = FilterWhere::generate(&conditions, 2).unwrap();
        assert!(sql.contains("$3"));
    }
}
