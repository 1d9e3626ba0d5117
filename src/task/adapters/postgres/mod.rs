//! `PostgreSQL` adapters for task and history persistence.

mod history;
mod models;
mod repository;
mod schema;

pub use history::PostgresHistoryRepository;
pub use repository::PostgresTaskRepository;
