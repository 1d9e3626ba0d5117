//! Statistics service over the task and history repositories.

use super::domain::{self, STREAK_LIMIT, Statistics};
use crate::calendar;
use crate::task::{
    domain::{CompletionStatus, DateRange, UserId},
    ports::{HistoryRepository, HistoryRepositoryError, TaskRepository, TaskRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Repository failures surfaced by statistics computation.
#[derive(Debug, Error)]
pub enum StatisticsError {
    /// Counting active tasks failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),

    /// Reading completion history failed.
    #[error(transparent)]
    History(#[from] HistoryRepositoryError),
}

/// Result type for statistics operations.
pub type StatisticsResult<T> = Result<T, StatisticsError>;

/// Computes per-user completion statistics.
pub struct StatisticsService<R, H, C>
where
    R: TaskRepository + ?Sized,
    H: HistoryRepository + ?Sized,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    history: Arc<H>,
    clock: Arc<C>,
}

impl<R, H, C> Clone for StatisticsService<R, H, C>
where
    R: TaskRepository + ?Sized,
    H: HistoryRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            history: Arc::clone(&self.history),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, H, C> StatisticsService<R, H, C>
where
    R: TaskRepository + ?Sized,
    H: HistoryRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new statistics service.
    #[must_use]
    pub const fn new(tasks: Arc<R>, history: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            history,
            clock,
        }
    }

    /// Computes statistics for `user` as of the clock's local today.
    ///
    /// # Errors
    ///
    /// Propagates repository failures unchanged.
    pub async fn statistics(&self, user: UserId) -> StatisticsResult<Statistics> {
        self.compute(user, calendar::today(&*self.clock)).await
    }

    /// Computes statistics for `user` as of `today`.
    ///
    /// History is read once for the whole streak window, so the day walk
    /// never issues more queries.
    ///
    /// # Errors
    ///
    /// Propagates repository failures unchanged.
    pub async fn compute(&self, user: UserId, today: NaiveDate) -> StatisticsResult<Statistics> {
        let total_active_tasks = self.tasks.count_active_for_user(user).await?;
        let completed_today = self
            .history
            .count_in_range(user, DateRange::day(today), CompletionStatus::Completed)
            .await?;
        let counts = self
            .history
            .count_by_day(
                user,
                calendar::trailing_days(today, STREAK_LIMIT + 1),
                CompletionStatus::Completed,
            )
            .await?;

        let statistics = Statistics {
            total_active_tasks,
            completed_today,
            streak: domain::streak(today, &counts),
            completion_rate: domain::completion_rate(completed_today, total_active_tasks),
            weekly_progress: domain::weekly_progress(today, &counts),
        };
        debug!(user_id = %user, streak = statistics.streak, "computed statistics");
        Ok(statistics)
    }
}
