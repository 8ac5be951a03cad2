pub mod types;
pub mod filters;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filters::{calculate_metadata, validate_filters};
pub use filter_order::FilterOrder;
pub use filter_where::FilterWhere;
