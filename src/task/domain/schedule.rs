//! Recurrence schedules deciding on which days a task is due.

use super::{TaskDomainError, TaskId};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const DAYS_PER_WEEK: u8 = 7;

/// Set of weekdays encoded as `0` (Sunday) through `6` (Saturday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Builds a non-empty weekday set from Sunday-based indices.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidWeekday`] for an index above `6` or
    /// [`TaskDomainError::EmptySelectedDays`] when no index is given.
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> Result<Self, TaskDomainError> {
        let mut bits = 0_u8;
        for index in indices {
            if index >= DAYS_PER_WEEK {
                return Err(TaskDomainError::InvalidWeekday(index));
            }
            bits |= 1 << index;
        }
        if bits == 0 {
            return Err(TaskDomainError::EmptySelectedDays);
        }
        Ok(Self(bits))
    }

    /// Returns `true` when the weekday is part of the set.
    #[must_use]
    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_sunday()) != 0
    }

    /// Returns the Sunday-based indices in ascending order.
    #[must_use]
    pub fn indices(self) -> Vec<u8> {
        (0..DAYS_PER_WEEK)
            .filter(|index| self.0 & (1 << index) != 0)
            .collect()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = TaskDomainError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(value)
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value.indices()
    }
}

/// Number of days per week a randomly scheduled task fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RandomDays(u8);

impl RandomDays {
    /// Day count used when a random schedule omits one.
    pub const DEFAULT: Self = Self(3);

    /// Creates a validated day count.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidRandomDays`] outside `1..=7`.
    pub const fn new(days: u8) -> Result<Self, TaskDomainError> {
        if days == 0 || days > DAYS_PER_WEEK {
            return Err(TaskDomainError::InvalidRandomDays(days));
        }
        Ok(Self(days))
    }

    /// Returns the number of days per week.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RandomDays {
    type Error = TaskDomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RandomDays> for u8 {
    fn from(value: RandomDays) -> Self {
        value.0
    }
}

/// Recurrence rule for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Schedule {
    /// Fires every day.
    #[default]
    Daily,
    /// Fires on the listed weekdays only.
    SelectedDays {
        /// Active weekdays.
        days: WeekdaySet,
    },
    /// Fires on a fixed number of pseudo-randomly chosen weekdays each week.
    Random {
        /// Days per week.
        #[serde(rename = "randomCount")]
        days_per_week: RandomDays,
    },
}

impl Schedule {
    /// Returns the canonical schedule type name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::SelectedDays { .. } => "SelectedDays",
            Self::Random { .. } => "Random",
        }
    }

    /// Builds a schedule from its wire type name and parameters.
    ///
    /// `days` is only consulted for `SelectedDays` and `random_count` only
    /// for `Random`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the type is unknown or the
    /// parameters for the chosen type are invalid.
    pub fn from_parts(
        kind: &str,
        days: &[u8],
        random_count: Option<u8>,
    ) -> Result<Self, TaskDomainError> {
        match kind.trim() {
            "Daily" => Ok(Self::Daily),
            "SelectedDays" => Ok(Self::SelectedDays {
                days: WeekdaySet::from_indices(days.iter().copied())?,
            }),
            "Random" => Ok(Self::Random {
                days_per_week: random_count.map_or(Ok(RandomDays::DEFAULT), RandomDays::new)?,
            }),
            other => Err(TaskDomainError::InvalidScheduleType(other.to_owned())),
        }
    }

    /// Returns `true` when the task is due on the given calendar day.
    ///
    /// Random schedules pick their weekdays per ISO week from a digest of
    /// the task identifier and week, so the choice is stable for the whole
    /// week and differs between tasks.
    #[must_use]
    pub fn fires_on(&self, task_id: TaskId, date: NaiveDate) -> bool {
        match self {
            Self::Daily => true,
            Self::SelectedDays { days } => days.contains(date.weekday()),
            Self::Random { days_per_week } => {
                random_week_days(task_id, date, *days_per_week).contains(date.weekday())
            }
        }
    }
}

fn random_week_days(task_id: TaskId, date: NaiveDate, count: RandomDays) -> WeekdaySet {
    let week = date.iso_week();
    let mut ranked: Vec<(u64, u8)> = (0..DAYS_PER_WEEK)
        .map(|index| {
            let mut hasher = Sha256::new();
            hasher.update(task_id.as_ref().as_bytes());
            hasher.update(week.year().to_string().as_bytes());
            hasher.update(week.week().to_string().as_bytes());
            hasher.update([index]);
            let digest = hasher.finalize();
            let rank = digest
                .iter()
                .take(8)
                .fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte));
            (rank, index)
        })
        .collect();
    ranked.sort_unstable();
    let chosen = ranked
        .into_iter()
        .take(usize::from(count.value()))
        .map(|(_, index)| index);
    // `count` is at least one, so the set is never empty.
    WeekdaySet::from_indices(chosen).unwrap_or(WeekdaySet(0))
}
