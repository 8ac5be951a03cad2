use super::error::FilterError;
use super::types::Filters;

pub struct FilterOrder;

impl FilterOrder {
    /// Build `ORDER BY "<column>" <dir>, "id" ASC`. The trailing id keeps page
    /// boundaries stable when the sort column has duplicates.
    pub fn generate(filters: &Filters) -> Result<String, FilterError> {
        let column = filters.sort_column()?;
        Self::validate_column(column)?;

        let direction = filters.sort_direction().to_sql();
        if column == "id" {
            return Ok(format!("ORDER BY \"id\" {}", direction));
        }
        Ok(format!("ORDER BY \"{}\" {}, \"id\" ASC", column, direction))
    }

    pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
        let mut chars = column.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        Ok(())
    }
}
