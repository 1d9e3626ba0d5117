//! Diesel row models for task and history persistence.

use super::schema::{task_history, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Task category.
    pub category: String,
    /// Recurrence rule payload.
    pub schedule: Value,
    /// Scheduled clock times payload.
    pub times: Value,
    /// Pre-reminder lead time in minutes.
    pub reminder_before: i32,
    /// Client notification channel.
    pub notification_channel: String,
    /// Task priority.
    pub priority: String,
    /// Medicine attributes payload.
    pub medicine_details: Option<Value>,
    /// Whether the task is active.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub owner_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Task category.
    pub category: String,
    /// Recurrence rule payload.
    pub schedule: Value,
    /// Scheduled clock times payload.
    pub times: Value,
    /// Pre-reminder lead time in minutes.
    pub reminder_before: i32,
    /// Client notification channel.
    pub notification_channel: String,
    /// Task priority.
    pub priority: String,
    /// Medicine attributes payload.
    pub medicine_details: Option<Value>,
    /// Whether the task is active.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for history records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// History record identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub user_id: uuid::Uuid,
    /// Referenced task identifier.
    pub task_id: uuid::Uuid,
    /// Calendar day.
    pub day: NaiveDate,
    /// Scheduled slot.
    pub scheduled_time: String,
    /// Completion status.
    pub status: String,
    /// Instant the status was recorded.
    pub completion_time: DateTime<Utc>,
    /// Optional notes.
    pub notes: Option<String>,
}
