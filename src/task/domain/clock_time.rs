//! Wall-clock times of day and reminder lead times.

use super::TaskDomainError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTES_PER_HOUR: u16 = 60;

/// A minute of the day in 24-hour `HH:MM` form.
///
/// Parsing is strict: exactly two zero-padded digits on each side of the
/// colon, so equality of two values is equality of their canonical strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minute_of_day: u16,
}

impl ClockTime {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: Self = Self { minute_of_day: 0 };

    /// Creates a clock time from hour and minute components.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidClockTime`] when the hour is not in
    /// `0..24` or the minute is not in `0..60`.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, TaskDomainError> {
        if hour >= 24 || minute >= MINUTES_PER_HOUR {
            return Err(TaskDomainError::InvalidClockTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self {
            minute_of_day: hour * MINUTES_PER_HOUR + minute,
        })
    }

    /// Truncates a naive time to its minute.
    #[must_use]
    pub fn from_naive_time(time: NaiveTime) -> Self {
        let hour = u16::try_from(time.hour()).unwrap_or_default();
        let minute = u16::try_from(time.minute()).unwrap_or_default();
        Self {
            minute_of_day: hour * MINUTES_PER_HOUR + minute,
        }
    }

    /// Parses a zero-padded `HH:MM` value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidClockTime`] for any other shape.
    pub fn parse(value: &str) -> Result<Self, TaskDomainError> {
        let invalid = || TaskDomainError::InvalidClockTime(value.to_owned());
        let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
        let is_two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !is_two_digits(hours) || !is_two_digits(minutes) {
            return Err(invalid());
        }
        let hour = hours.parse::<u16>().map_err(|_| invalid())?;
        let minute = minutes.parse::<u16>().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }

    /// Returns the hour component.
    #[must_use]
    pub const fn hour(self) -> u16 {
        self.minute_of_day.div_euclid(MINUTES_PER_HOUR)
    }

    /// Returns the minute component.
    #[must_use]
    pub const fn minute(self) -> u16 {
        self.minute_of_day.rem_euclid(MINUTES_PER_HOUR)
    }

    /// Returns minutes elapsed since midnight.
    #[must_use]
    pub const fn minute_of_day(self) -> u16 {
        self.minute_of_day
    }

    /// Subtracts minutes within the same calendar day.
    ///
    /// Returns `None` when the result would fall on the previous day; no
    /// wraparound to the evening before is performed.
    #[must_use]
    pub fn checked_sub_minutes(self, minutes: u16) -> Option<Self> {
        self.minute_of_day
            .checked_sub(minutes)
            .map(|minute_of_day| Self { minute_of_day })
    }

    /// Returns `true` when `self` lies in the half-open window
    /// `[start, end)`, where a window with `start > end` wraps past midnight.
    #[must_use]
    pub fn is_within(self, start: Self, end: Self) -> bool {
        if start <= end {
            start <= self && self < end
        } else {
            self >= start || self < end
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl Default for ClockTime {
    fn default() -> Self {
        Self::MIDNIGHT
    }
}

/// Non-empty, sorted, de-duplicated set of scheduled clock times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClockTime>", into = "Vec<ClockTime>")]
pub struct ReminderTimes(Vec<ClockTime>);

impl ReminderTimes {
    /// Builds a validated time set.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTimes`] when no time is given.
    pub fn new(times: impl IntoIterator<Item = ClockTime>) -> Result<Self, TaskDomainError> {
        let mut collected: Vec<ClockTime> = times.into_iter().collect();
        collected.sort_unstable();
        collected.dedup();
        if collected.is_empty() {
            return Err(TaskDomainError::EmptyTimes);
        }
        Ok(Self(collected))
    }

    /// Parses and validates raw `HH:MM` strings.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidClockTime`] for a malformed entry or
    /// [`TaskDomainError::EmptyTimes`] when the list is empty.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, TaskDomainError> {
        let parsed = raw
            .iter()
            .map(|value| ClockTime::parse(value.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// Returns the times in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[ClockTime] {
        &self.0
    }

    /// Returns the earliest scheduled time.
    #[must_use]
    pub fn first(&self) -> Option<ClockTime> {
        self.0.first().copied()
    }
}

impl Default for ReminderTimes {
    fn default() -> Self {
        Self(vec![ClockTime {
            minute_of_day: 8 * MINUTES_PER_HOUR,
        }])
    }
}

impl TryFrom<Vec<ClockTime>> for ReminderTimes {
    type Error = TaskDomainError;

    fn try_from(value: Vec<ClockTime>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReminderTimes> for Vec<ClockTime> {
    fn from(value: ReminderTimes) -> Self {
        value.0
    }
}

/// Minutes before a scheduled time at which a pre-reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ReminderLead(u16);

impl ReminderLead {
    /// Smallest accepted lead time in minutes.
    pub const MIN_MINUTES: u32 = 1;
    /// Largest accepted lead time in minutes.
    pub const MAX_MINUTES: u32 = 60;
    /// Lead time applied when a task does not specify one.
    pub const DEFAULT: Self = Self(5);

    /// Creates a validated lead time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidReminderLead`] outside `1..=60`.
    pub fn new(minutes: u32) -> Result<Self, TaskDomainError> {
        if !(Self::MIN_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            return Err(TaskDomainError::InvalidReminderLead(minutes));
        }
        u16::try_from(minutes)
            .map(Self)
            .map_err(|_| TaskDomainError::InvalidReminderLead(minutes))
    }

    /// Returns the lead time in minutes.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }
}

impl Default for ReminderLead {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for ReminderLead {
    type Error = TaskDomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReminderLead> for u32 {
    fn from(value: ReminderLead) -> Self {
        Self::from(value.0)
    }
}
