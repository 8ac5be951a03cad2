use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    /// The sort token reached SQL generation without being in the allow-list.
    #[error("Unsafe sort parameter: {0}")]
    UnsafeSort(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),
}
