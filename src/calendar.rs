//! Server-local wall-clock helpers over [`mockable::Clock`].
//!
//! Every scheduling and statistics decision is made in the server's local
//! frame. Routing all reads through these helpers keeps the clock source
//! swappable, so per-user time zones can be introduced without touching the
//! callers.

use crate::task::domain::{ClockTime, DateRange};
use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use mockable::Clock;

/// Returns the current local date and time, without a zone.
#[must_use]
pub fn local_now(clock: &impl Clock) -> NaiveDateTime {
    clock.local().naive_local()
}

/// Returns the current local calendar day.
#[must_use]
pub fn today(clock: &impl Clock) -> NaiveDate {
    local_now(clock).date()
}

/// Returns the current local minute of the day.
#[must_use]
pub fn current_minute(clock: &impl Clock) -> ClockTime {
    ClockTime::from_naive_time(local_now(clock).time())
}

/// Returns the `days`-long range of calendar days ending on `last`.
///
/// A `days` value of zero is treated as one.
#[must_use]
pub fn trailing_days(last: NaiveDate, days: u32) -> DateRange {
    let span = u64::from(days.saturating_sub(1));
    let first = last.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
    DateRange::new(first, last)
}

/// Clock frozen at a fixed local instant.
///
/// Used by tests and tooling that need deterministic "now" values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    local: DateTime<Local>,
}

impl FixedClock {
    /// Freezes the clock at the given local wall-clock time.
    ///
    /// A wall-clock time skipped by a daylight-saving jump is interpreted as
    /// UTC instead.
    #[must_use]
    pub fn at(wall_clock: NaiveDateTime) -> Self {
        let local = Local
            .from_local_datetime(&wall_clock)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&wall_clock));
        Self { local }
    }

    /// Returns a clock advanced by `minutes`.
    #[must_use]
    pub fn advanced_by_minutes(self, minutes: i64) -> Self {
        Self::at(self.local.naive_local() + chrono::Duration::minutes(minutes))
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.local
    }

    fn utc(&self) -> DateTime<Utc> {
        self.local.with_timezone(&Utc)
    }
}
