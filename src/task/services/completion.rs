//! Service layer for marking tasks complete and listing today's completions.

use super::{TaskServiceError, TaskServiceResult, lifecycle::load_owned_task};
use crate::calendar;
use crate::task::{
    domain::{CompletionStatus, History, ScheduledSlot, TaskId, UserId},
    ports::{HistoryRepository, TaskRepository},
};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Request payload for marking a task complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkCompleteRequest {
    scheduled_time: Option<String>,
    notes: Option<String>,
}

impl MarkCompleteRequest {
    /// Creates a request that completes the task's first scheduled time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheduled slot, either `HH:MM` or `ALL`.
    #[must_use]
    pub fn with_scheduled_time(mut self, scheduled_time: impl Into<String>) -> Self {
        self.scheduled_time = Some(scheduled_time.into());
        self
    }

    /// Attaches notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Completion tracking service.
pub struct CompletionService<R, H, C>
where
    R: TaskRepository + ?Sized,
    H: HistoryRepository + ?Sized,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    history: Arc<H>,
    clock: Arc<C>,
}

impl<R, H, C> Clone for CompletionService<R, H, C>
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

impl<R, H, C> CompletionService<R, H, C>
where
    R: TaskRepository + ?Sized,
    H: HistoryRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new completion service.
    #[must_use]
    pub const fn new(tasks: Arc<R>, history: Arc<H>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            history,
            clock,
        }
    }

    /// Records a completion for today's local calendar day.
    ///
    /// The slot defaults to the task's first scheduled time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::NotAuthorized`] for tasks the user cannot access,
    /// [`TaskServiceError::Domain`] for a malformed slot, and
    /// [`TaskServiceError::AlreadyCompleted`] when today already has a
    /// completed record.
    pub async fn mark_complete(
        &self,
        user: UserId,
        task_id: TaskId,
        request: MarkCompleteRequest,
    ) -> TaskServiceResult<History> {
        let task = load_owned_task(&*self.tasks, user, task_id).await?;
        let date = calendar::today(&*self.clock);

        let slot = request.scheduled_time.map_or_else(
            || Ok(task.times().first().map_or(ScheduledSlot::All, ScheduledSlot::At)),
            ScheduledSlot::try_from,
        )?;

        let existing = self.history.find_for_day(user, task_id, date).await?;
        if existing.is_some_and(|record| record.status() == CompletionStatus::Completed) {
            return Err(TaskServiceError::AlreadyCompleted { task_id, date });
        }

        let record = History::completed(user, task_id, date, slot, self.clock.utc())
            .with_notes(request.notes);
        self.history.store(&record).await?;
        info!(task_id = %task_id, user_id = %user, %date, "task completed");
        Ok(record)
    }

    /// Lists the tasks `user` completed today.
    ///
    /// Identifiers of since-deleted tasks are included.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::History`] when the lookup fails.
    pub async fn completed_today(&self, user: UserId) -> TaskServiceResult<Vec<TaskId>> {
        let date = calendar::today(&*self.clock);
        let records = self
            .history
            .list_for_day(user, date, CompletionStatus::Completed)
            .await?;
        Ok(records.iter().map(History::task_id).collect())
    }
}

