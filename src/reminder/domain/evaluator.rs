//! Minute-granularity time window evaluation.
//!
//! The evaluator is a pure function of the current local minute and a
//! task's scheduled times. Pre-reminders are computed within the same
//! calendar day: a scheduled time whose lead reaches back past midnight
//! produces no pre-reminder at all, rather than one on the previous
//! evening.

use crate::task::domain::{ClockTime, ReminderLead, ReminderTimes};

/// Kind of reminder emitted for a scheduled time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireKind {
    /// Sent `lead` minutes before the scheduled time.
    Pre,
    /// Sent at the scheduled time.
    Exact,
}

impl FireKind {
    /// Returns `true` for pre-reminders.
    #[must_use]
    pub const fn is_pre(self) -> bool {
        matches!(self, Self::Pre)
    }
}

/// A reminder that fires during the evaluated minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FireEvent {
    /// Pre-reminder or exact reminder.
    pub kind: FireKind,
    /// The scheduled time the reminder refers to.
    pub scheduled_time: ClockTime,
    /// Lead time, meaningful for pre-reminders.
    pub lead: ReminderLead,
}

/// Returns the reminders firing at `now` for the given schedule times.
///
/// Each scheduled time is checked independently, so one minute may yield a
/// pre-reminder for one time and an exact reminder for another. Events are
/// ordered by scheduled time, pre-reminder first.
#[must_use]
pub fn evaluate(now: ClockTime, times: &ReminderTimes, lead: ReminderLead) -> Vec<FireEvent> {
    let mut events = Vec::new();
    for &scheduled_time in times.as_slice() {
        if scheduled_time.checked_sub_minutes(lead.minutes()) == Some(now) {
            events.push(FireEvent {
                kind: FireKind::Pre,
                scheduled_time,
                lead,
            });
        }
        if scheduled_time == now {
            events.push(FireEvent {
                kind: FireKind::Exact,
                scheduled_time,
                lead,
            });
        }
    }
    events
}
