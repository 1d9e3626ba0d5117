//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
///
/// Every variant is a validation failure surfaced to the caller unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The category value is not one of the supported categories.
    #[error("unsupported task category: {0}")]
    InvalidCategory(String),

    /// The schedule type is unsupported.
    #[error("unsupported schedule type: {0}")]
    InvalidScheduleType(String),

    /// A weekday index is outside `0..=6`.
    #[error("invalid weekday {0}, expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday(u8),

    /// A selected-days schedule was given no days.
    #[error("selected-days schedule requires at least one weekday")]
    EmptySelectedDays,

    /// A random schedule day count is outside `1..=7`.
    #[error("random schedule must fire on 1 to 7 days per week, got {0}")]
    InvalidRandomDays(u8),

    /// A clock time is not zero-padded `HH:MM` 24-hour form.
    #[error("invalid clock time '{0}', expected zero-padded HH:MM")]
    InvalidClockTime(String),

    /// The task has no scheduled clock times.
    #[error("task must have at least one scheduled time")]
    EmptyTimes,

    /// The reminder lead time is outside `1..=60` minutes.
    #[error("reminder lead time must be between 1 and 60 minutes, got {0}")]
    InvalidReminderLead(u32),

    /// The notification channel is unsupported.
    #[error("unsupported notification channel: {0}")]
    InvalidNotificationChannel(String),

    /// The priority value is unsupported.
    #[error("unsupported priority: {0}")]
    InvalidPriority(String),

    /// The medicine instruction value is unsupported.
    #[error("unsupported medicine instruction: {0}")]
    InvalidMedicineInstruction(String),
}

/// Error returned while parsing completion statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown completion status: {0}")]
pub struct ParseCompletionStatusError(pub String);
