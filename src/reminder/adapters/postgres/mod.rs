//! `PostgreSQL` adapter for user records.

mod repository;
mod schema;

pub use repository::PostgresUserRepository;
