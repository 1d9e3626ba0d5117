//! Day gating applied before a task's times are evaluated.

use crate::task::domain::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Policy deciding whether a task's schedule restricts dispatch days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleGating {
    /// Selected-days and random schedules fire only on their days.
    #[default]
    HonorSchedule,
    /// Every active task fires every day, whatever its schedule.
    FireDaily,
}

impl ScheduleGating {
    /// Returns `true` when `task` may fire on `date`.
    #[must_use]
    pub fn is_due(self, task: &Task, date: NaiveDate) -> bool {
        match self {
            Self::HonorSchedule => task.schedule().fires_on(task.id(), date),
            Self::FireDaily => true,
        }
    }
}
