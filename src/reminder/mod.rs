//! Push reminders: time-window evaluation, subscriptions and dispatch.
//!
//! The dispatch loop in [`services`] reads active tasks from the task
//! context's repository port, evaluates them with the pure functions in
//! [`domain`], and delivers payloads through the [`ports::NotificationSender`]
//! port. Delivery failures prune the failing subscription from the user
//! record.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
