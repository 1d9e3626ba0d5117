//! Completion statistics: daily rate, streak and the weekly histogram.
//!
//! The computation in [`domain`] is pure over per-day completion counts;
//! [`services`] gathers those counts from the task context's repository
//! ports.

pub mod domain;
pub mod services;
