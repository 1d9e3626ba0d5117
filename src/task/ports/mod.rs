//! Port contracts for task and history persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod history;
pub mod repository;

pub use history::{HistoryRepository, HistoryRepositoryError, HistoryRepositoryResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
