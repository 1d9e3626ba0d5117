//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::postgres::{BoxedDbError, PgPool, run_blocking_with};
use crate::task::{
    domain::{
        MedicineDetails, NotificationChannel, PersistedTaskData, Priority, ReminderLead,
        ReminderTimes, Schedule, Task, TaskAttributes, TaskCategory, TaskId, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::Arc;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking_with(&self.pool, boxed_persistence, f).await
    }
}

fn boxed_persistence(err: BoxedDbError) -> TaskRepositoryError {
    TaskRepositoryError::Persistence(Arc::from(err))
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_row(task)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_active(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::is_active.eq(true))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_for_user(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .order(tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn count_active_for_user(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .filter(tasks::is_active.eq(true))
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            u64::try_from(count).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

pub(super) fn to_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let schedule =
        serde_json::to_value(task.schedule()).map_err(TaskRepositoryError::persistence)?;
    let times = serde_json::to_value(task.times()).map_err(TaskRepositoryError::persistence)?;
    let medicine_details = task
        .medicine()
        .map(serde_json::to_value)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        category: task.category().as_str().to_owned(),
        schedule,
        times,
        reminder_before: i32::from(task.reminder_lead().minutes()),
        notification_channel: task.channel().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        medicine_details,
        is_active: task.is_active(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        title,
        description,
        category,
        schedule: schedule_json,
        times: times_json,
        reminder_before,
        notification_channel,
        priority,
        medicine_details,
        is_active,
        created_at,
        updated_at,
    } = row;

    let schedule = serde_json::from_value::<Schedule>(schedule_json)
        .map_err(TaskRepositoryError::persistence)?;
    let times = serde_json::from_value::<ReminderTimes>(times_json)
        .map_err(TaskRepositoryError::persistence)?;
    let medicine = medicine_details
        .map(serde_json::from_value::<MedicineDetails>)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let lead_minutes = u32::try_from(reminder_before).map_err(TaskRepositoryError::persistence)?;

    let attributes = TaskAttributes {
        title,
        description,
        category: TaskCategory::try_from(category.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        schedule,
        times,
        reminder_lead: ReminderLead::new(lead_minutes).map_err(TaskRepositoryError::persistence)?,
        channel: NotificationChannel::try_from(notification_channel.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        priority: Priority::try_from(priority.as_str()).map_err(TaskRepositoryError::persistence)?,
        medicine,
        is_active,
    };

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: UserId::from_uuid(owner_id),
        attributes,
        created_at,
        updated_at,
    }))
}
