//! In-memory completion history repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{CompletionStatus, DateRange, History, TaskId, UserId},
    ports::{HistoryRepository, HistoryRepositoryError, HistoryRepositoryResult},
};

/// Thread-safe in-memory history repository.
///
/// Mirrors the partial unique index of the `PostgreSQL` schema: a second
/// completed record for the same user, task and day is rejected.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryRepository {
    records: Arc<RwLock<Vec<History>>>,
}

impl InMemoryHistoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> HistoryRepositoryError {
    HistoryRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn matches_user_status(
    record: &History,
    user: UserId,
    range: DateRange,
    status: CompletionStatus,
) -> bool {
    record.user_id() == user && record.status() == status && range.contains(record.date())
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn store(&self, history: &History) -> HistoryRepositoryResult<()> {
        let mut records = self.records.write().map_err(lock_error)?;
        if records.iter().any(|record| record.id() == history.id()) {
            return Err(HistoryRepositoryError::DuplicateHistory(history.id()));
        }
        let is_duplicate_completion = history.status() == CompletionStatus::Completed
            && records.iter().any(|record| {
                record.status() == CompletionStatus::Completed
                    && record.user_id() == history.user_id()
                    && record.task_id() == history.task_id()
                    && record.date() == history.date()
            });
        if is_duplicate_completion {
            return Err(HistoryRepositoryError::DuplicateCompletion {
                task_id: history.task_id(),
                date: history.date(),
            });
        }
        records.push(history.clone());
        Ok(())
    }

    async fn find_for_day(
        &self,
        user: UserId,
        task: TaskId,
        date: NaiveDate,
    ) -> HistoryRepositoryResult<Option<History>> {
        let records = self.records.read().map_err(lock_error)?;
        let mut matching = records.iter().filter(|record| {
            record.user_id() == user && record.task_id() == task && record.date() == date
        });
        let found = matching
            .clone()
            .find(|record| record.status() == CompletionStatus::Completed)
            .or_else(|| matching.next())
            .cloned();
        Ok(found)
    }

    async fn list_for_day(
        &self,
        user: UserId,
        date: NaiveDate,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<Vec<History>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records
            .iter()
            .filter(|record| matches_user_status(record, user, DateRange::day(date), status))
            .cloned()
            .collect())
    }

    async fn count_in_range(
        &self,
        user: UserId,
        range: DateRange,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<u64> {
        let records = self.records.read().map_err(lock_error)?;
        let count = records
            .iter()
            .filter(|record| matches_user_status(record, user, range, status))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn count_by_day(
        &self,
        user: UserId,
        range: DateRange,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<BTreeMap<NaiveDate, u64>> {
        let records = self.records.read().map_err(lock_error)?;
        let mut counts = BTreeMap::new();
        for record in records
            .iter()
            .filter(|record| matches_user_status(record, user, range, status))
        {
            *counts.entry(record.date()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
