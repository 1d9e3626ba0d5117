//! In-memory adapters for task and history persistence.

mod history;
mod task;

pub use history::InMemoryHistoryRepository;
pub use task::InMemoryTaskRepository;
