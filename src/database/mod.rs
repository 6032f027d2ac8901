pub mod manager;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod repository;
pub mod schema;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgDocumentStore;
pub use repository::Repository;
pub use store::{DocumentStore, GroupSummary, JsonDocument};
