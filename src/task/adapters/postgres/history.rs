//! `PostgreSQL` repository implementation for completion history.

use super::{models::HistoryRow, schema::task_history};
use crate::postgres::{BoxedDbError, PgPool, run_blocking_with};
use crate::task::{
    domain::{
        CompletionStatus, DateRange, History, HistoryData, HistoryId, ScheduledSlot, TaskId,
        UserId,
    },
    ports::{HistoryRepository, HistoryRepositoryError, HistoryRepositoryResult},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::BTreeMap;
use std::sync::Arc;

const COMPLETED_UNIQUE_INDEX: &str = "idx_task_history_completed_unique";

/// `PostgreSQL`-backed completion history repository.
#[derive(Debug, Clone)]
pub struct PostgresHistoryRepository {
    pool: PgPool,
}

impl PostgresHistoryRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> HistoryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> HistoryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking_with(&self.pool, boxed_persistence, f).await
    }
}

fn boxed_persistence(err: BoxedDbError) -> HistoryRepositoryError {
    HistoryRepositoryError::Persistence(Arc::from(err))
}

#[async_trait]
impl HistoryRepository for PostgresHistoryRepository {
    async fn store(&self, history: &History) -> HistoryRepositoryResult<()> {
        let row = to_row(history);
        let history_id = history.id();
        let task_id = history.task_id();
        let date = history.date();

        self.run_blocking(move |connection| {
            diesel::insert_into(task_history::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match &err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                        if info.constraint_name() == Some(COMPLETED_UNIQUE_INDEX) {
                            HistoryRepositoryError::DuplicateCompletion { task_id, date }
                        } else {
                            HistoryRepositoryError::DuplicateHistory(history_id)
                        }
                    }
                    _ => HistoryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_for_day(
        &self,
        user: UserId,
        task: TaskId,
        date: NaiveDate,
    ) -> HistoryRepositoryResult<Option<History>> {
        self.run_blocking(move |connection| {
            let rows = task_history::table
                .filter(task_history::user_id.eq(user.into_inner()))
                .filter(task_history::task_id.eq(task.into_inner()))
                .filter(task_history::day.eq(date))
                .order(task_history::completion_time.asc())
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)
                .map_err(HistoryRepositoryError::persistence)?;
            let records = rows
                .into_iter()
                .map(row_to_history)
                .collect::<HistoryRepositoryResult<Vec<_>>>()?;
            let preferred = records
                .iter()
                .position(|record| record.status() == CompletionStatus::Completed)
                .unwrap_or(0);
            Ok(records.into_iter().nth(preferred))
        })
        .await
    }

    async fn list_for_day(
        &self,
        user: UserId,
        date: NaiveDate,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<Vec<History>> {
        self.run_blocking(move |connection| {
            let rows = task_history::table
                .filter(task_history::user_id.eq(user.into_inner()))
                .filter(task_history::day.eq(date))
                .filter(task_history::status.eq(status.as_str()))
                .order(task_history::completion_time.asc())
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)
                .map_err(HistoryRepositoryError::persistence)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }

    async fn count_in_range(
        &self,
        user: UserId,
        range: DateRange,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = task_history::table
                .filter(task_history::user_id.eq(user.into_inner()))
                .filter(task_history::day.between(range.start(), range.end()))
                .filter(task_history::status.eq(status.as_str()))
                .count()
                .get_result(connection)
                .map_err(HistoryRepositoryError::persistence)?;
            u64::try_from(count).map_err(HistoryRepositoryError::persistence)
        })
        .await
    }

    async fn count_by_day(
        &self,
        user: UserId,
        range: DateRange,
        status: CompletionStatus,
    ) -> HistoryRepositoryResult<BTreeMap<NaiveDate, u64>> {
        self.run_blocking(move |connection| {
            let rows: Vec<(NaiveDate, i64)> = task_history::table
                .filter(task_history::user_id.eq(user.into_inner()))
                .filter(task_history::day.between(range.start(), range.end()))
                .filter(task_history::status.eq(status.as_str()))
                .group_by(task_history::day)
                .select((task_history::day, count_star()))
                .load(connection)
                .map_err(HistoryRepositoryError::persistence)?;
            rows.into_iter()
                .map(|(day, count)| {
                    u64::try_from(count)
                        .map(|value| (day, value))
                        .map_err(HistoryRepositoryError::persistence)
                })
                .collect()
        })
        .await
    }
}

fn to_row(history: &History) -> HistoryRow {
    HistoryRow {
        id: history.id().into_inner(),
        user_id: history.user_id().into_inner(),
        task_id: history.task_id().into_inner(),
        day: history.date(),
        scheduled_time: history.scheduled_time().to_string(),
        status: history.status().as_str().to_owned(),
        completion_time: history.completion_time(),
        notes: history.notes().map(str::to_owned),
    }
}

fn row_to_history(row: HistoryRow) -> HistoryRepositoryResult<History> {
    let scheduled_time = ScheduledSlot::try_from(row.scheduled_time)
        .map_err(HistoryRepositoryError::persistence)?;
    let status = CompletionStatus::try_from(row.status.as_str())
        .map_err(HistoryRepositoryError::persistence)?;

    Ok(History::from_data(HistoryData {
        id: HistoryId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        task_id: TaskId::from_uuid(row.task_id),
        date: row.day,
        scheduled_time,
        status,
        completion_time: row.completion_time,
        notes: row.notes,
    }))
}
