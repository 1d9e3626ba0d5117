//! Daily completion history records.

use super::{ClockTime, HistoryId, ParseCompletionStatusError, TaskId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome recorded for a task on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    /// The task was done.
    Completed,
    /// The user chose to skip the task.
    Skipped,
    /// The task was not done.
    Missed,
}

impl CompletionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Missed => "missed",
        }
    }
}

impl TryFrom<&str> for CompletionStatus {
    type Error = ParseCompletionStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            "missed" => Ok(Self::Missed),
            _ => Err(ParseCompletionStatusError(value.to_owned())),
        }
    }
}

/// The scheduled slot a history record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScheduledSlot {
    /// A specific scheduled clock time.
    At(ClockTime),
    /// Every scheduled time of the day.
    All,
}

impl ScheduledSlot {
    /// Wire form of [`ScheduledSlot::All`].
    pub const ALL_SENTINEL: &'static str = "ALL";
}

impl fmt::Display for ScheduledSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(time) => write!(f, "{time}"),
            Self::All => f.write_str(Self::ALL_SENTINEL),
        }
    }
}

impl TryFrom<String> for ScheduledSlot {
    type Error = super::TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == Self::ALL_SENTINEL {
            return Ok(Self::All);
        }
        ClockTime::parse(&value).map(Self::At)
    }
}

impl From<ScheduledSlot> for String {
    fn from(value: ScheduledSlot) -> Self {
        value.to_string()
    }
}

/// A completion record for one (user, task, calendar day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    id: HistoryId,
    #[serde(rename = "user")]
    user_id: UserId,
    #[serde(rename = "task")]
    task_id: TaskId,
    date: NaiveDate,
    scheduled_time: ScheduledSlot,
    status: CompletionStatus,
    completion_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

/// Parameter object for creating or reconstructing a history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryData {
    /// Record identifier.
    pub id: HistoryId,
    /// Owning user.
    pub user_id: UserId,
    /// Referenced task. The task may since have been deleted.
    pub task_id: TaskId,
    /// Calendar day, without a time component.
    pub date: NaiveDate,
    /// Scheduled slot the record corresponds to.
    pub scheduled_time: ScheduledSlot,
    /// Recorded outcome.
    pub status: CompletionStatus,
    /// Instant the outcome was recorded.
    pub completion_time: DateTime<Utc>,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

impl History {
    /// Creates a completed record for `date`.
    #[must_use]
    pub fn completed(
        user_id: UserId,
        task_id: TaskId,
        date: NaiveDate,
        scheduled_time: ScheduledSlot,
        completion_time: DateTime<Utc>,
    ) -> Self {
        Self::from_data(HistoryData {
            id: HistoryId::new(),
            user_id,
            task_id,
            date,
            scheduled_time,
            status: CompletionStatus::Completed,
            completion_time,
            notes: None,
        })
    }

    /// Reconstructs a record from its parts.
    #[must_use]
    pub fn from_data(data: HistoryData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            task_id: data.task_id,
            date: data.date,
            scheduled_time: data.scheduled_time,
            status: data.status,
            completion_time: data.completion_time,
            notes: data.notes,
        }
    }

    /// Attaches notes, dropping blank ones.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        self
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the referenced task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the calendar day.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the scheduled slot.
    #[must_use]
    pub const fn scheduled_time(&self) -> ScheduledSlot {
        self.scheduled_time
    }

    /// Returns the recorded outcome.
    #[must_use]
    pub const fn status(&self) -> CompletionStatus {
        self.status
    }

    /// Returns the instant the outcome was recorded.
    #[must_use]
    pub const fn completion_time(&self) -> DateTime<Utc> {
        self.completion_time
    }

    /// Returns the notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering `start..=end`; the bounds are swapped when
    /// given in reverse.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a range covering a single day.
    #[must_use]
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Returns the first day of the range.
    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range.
    #[must_use]
    pub const fn end(self) -> NaiveDate {
        self.end
    }

    /// Returns `true` when `date` falls within the range.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
