//! Domain model for recurring tasks and their completion history.
//!
//! Tasks carry their recurrence rule and scheduled clock times; history
//! records mark per-day outcomes. Infrastructure concerns stay outside of
//! the domain boundary.

mod clock_time;
mod error;
mod history;
mod ids;
mod schedule;
mod task;

pub use clock_time::{ClockTime, ReminderLead, ReminderTimes};
pub use error::{ParseCompletionStatusError, TaskDomainError};
pub use history::{CompletionStatus, DateRange, History, HistoryData, ScheduledSlot};
pub use ids::{HistoryId, TaskId, UserId};
pub use schedule::{RandomDays, Schedule, WeekdaySet};
pub use task::{
    MedicineDetails, MedicineInstruction, NotificationChannel, PersistedTaskData, Priority, Task,
    TaskAttributes, TaskCategory, TaskPatch,
};
