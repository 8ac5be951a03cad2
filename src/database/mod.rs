pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod resource;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::Repository;
pub use resource::Resource;
