//! Nudge: recurring task tracking with minute-granularity push reminders.
//!
//! Users define recurring tasks with scheduled clock times, mark them
//! complete each day, and receive push reminders shortly before and at each
//! scheduled time. Completion history feeds streak and weekly statistics.
//!
//! # Architecture
//!
//! Nudge follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and push delivery
//! - **Adapters**: In-memory, `PostgreSQL` and HTTP relay implementations
//!
//! # Modules
//!
//! - [`task`]: Tasks, completion history and their lifecycle services
//! - [`reminder`]: Time window evaluation, push subscriptions and dispatch
//! - [`stats`]: Streak, completion rate and weekly progress
//! - [`api`]: axum HTTP layer
//! - [`config`]: TOML configuration
//! - [`calendar`]: Local wall-clock helpers

pub mod api;
pub mod calendar;
pub mod config;
pub mod postgres;
pub mod reminder;
pub mod stats;
pub mod task;
