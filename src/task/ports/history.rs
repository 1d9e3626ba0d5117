//! Repository port for completion history.

use crate::task::domain::{CompletionStatus, DateRange, History, HistoryId, TaskId, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for history repository operations.
pub type HistoryRepositoryResult<T> = Result<T, HistoryRepositoryError>;

/// Completion history persistence contract.
///
/// Records are append-only: there is no update or delete operation.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Stores a new history record.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryRepositoryError::DuplicateCompletion`] when the store
    /// itself detects a second completed record for the same user, task and
    /// day.
    async fn store(&self, history: &History) -> HistoryRepositoryResult<()>;

    /// Finds the record for one (user, task, day), preferring a completed
    /// one when several exist.
    async fn find_for_day(
        &self,
        user: UserId,
        task: TaskId,
        date: NaiveDate,
    ) -> HistoryRepositoryResult<Option<History>>;

    /// Lists a user's records on `date` with the given status.
    async fn list_for_day(
        &self,
        user: UserId,
        date: NaiveDate,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<Vec<History>>;

    /// Counts a user's records within `range` with the given status.
    async fn count_in_range(
        &self,
        user: UserId,
        range: DateRange,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<u64>;

    /// Counts a user's records within `range` with the given status, grouped
    /// by day. Days without records are absent from the map.
    async fn count_by_day(
        &self,
        user: UserId,
        range: DateRange,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<BTreeMap<NaiveDate, u64>>;
}

/// Errors returned by history repository implementations.
#[derive(Debug, Clone, Error)]
pub enum HistoryRepositoryError {
    /// A record with the same identifier already exists.
    #[error("duplicate history identifier: {0}")]
    DuplicateHistory(HistoryId),

    /// A completed record already exists for the task and day.
    #[error("task {task_id} already completed on {date}")]
    DuplicateCompletion {
        /// Completed task.
        task_id: TaskId,
        /// Calendar day.
        date: NaiveDate,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl HistoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
