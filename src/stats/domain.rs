//! Statistics report types and the pure computations behind them.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Maximum streak length reported.
pub const STREAK_LIMIT: u32 = 365;

/// Number of days in the weekly histogram.
pub const WEEK_DAYS: u32 = 7;

/// Completed-record counts keyed by calendar day.
pub type DailyCounts = BTreeMap<NaiveDate, u64>;

/// One bar of the weekly histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    /// Calendar day.
    pub date: NaiveDate,
    /// Short English weekday name, such as `"Mon"`.
    pub day_name: String,
    /// Day of the month.
    #[serde(rename = "dayNum")]
    pub day_number: u32,
    /// Whether this entry is today.
    pub is_today: bool,
    /// Completed records on the day.
    pub completed: u64,
}

/// A user's statistics for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Active tasks owned by the user.
    pub total_active_tasks: u64,
    /// Completed records dated today.
    pub completed_today: u64,
    /// Consecutive days with a completion, walking back from today.
    pub streak: u32,
    /// Today's completions as a rounded percentage of active tasks.
    pub completion_rate: u64,
    /// The last seven days, oldest first.
    pub weekly_progress: Vec<DayProgress>,
}

/// Returns `round(completed / total * 100)`, or zero without active tasks.
///
/// Halves round up. The rate may exceed 100 when completions outnumber
/// active tasks.
#[must_use]
pub fn completion_rate(completed: u64, total: u64) -> u64 {
    let doubled_total = total.saturating_mul(2);
    completed
        .saturating_mul(200)
        .saturating_add(total)
        .checked_div(doubled_total)
        .unwrap_or(0)
}

/// Counts consecutive days with at least one completion ending at `today`.
///
/// An empty today does not break the streak; counting then starts from
/// yesterday. The walk stops at the first empty earlier day or at
/// [`STREAK_LIMIT`].
#[must_use]
pub fn streak(today: NaiveDate, counts: &DailyCounts) -> u32 {
    let has_completion = |date: NaiveDate| counts.get(&date).is_some_and(|count| *count > 0);
    let mut cursor = if has_completion(today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut length = 0;
    while let Some(date) = cursor {
        if length >= STREAK_LIMIT || !has_completion(date) {
            break;
        }
        length += 1;
        cursor = date.pred_opt();
    }
    length
}

/// Builds the seven-day histogram ending on `today`, oldest first.
#[must_use]
pub fn weekly_progress(today: NaiveDate, counts: &DailyCounts) -> Vec<DayProgress> {
    (0..WEEK_DAYS)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| DayProgress {
            date,
            day_name: date.format("%a").to_string(),
            day_number: date.day(),
            is_today: date == today,
            completed: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}
