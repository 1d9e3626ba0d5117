//! Error types shared by the task services.

use crate::task::{
    domain::{TaskDomainError, TaskId},
    ports::{HistoryRepositoryError, TaskRepositoryError},
};
use chrono::NaiveDate;
use thiserror::Error;

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task belongs to another user.
    #[error("not authorized to access task {0}")]
    NotAuthorized(TaskId),

    /// The task already has a completed record for the day.
    #[error("task {task_id} already completed on {date}")]
    AlreadyCompleted {
        /// Completed task.
        task_id: TaskId,
        /// Local calendar day.
        date: NaiveDate,
    },

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),

    /// History repository operation failed.
    #[error(transparent)]
    History(HistoryRepositoryError),
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            other => Self::Repository(other),
        }
    }
}

impl From<HistoryRepositoryError> for TaskServiceError {
    fn from(err: HistoryRepositoryError) -> Self {
        match err {
            HistoryRepositoryError::DuplicateCompletion { task_id, date } => {
                Self::AlreadyCompleted { task_id, date }
            }
            other => Self::History(other),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
