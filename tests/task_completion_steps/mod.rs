//! Step definitions for daily task completion scenarios.

pub mod world;
mod when;
mod then;
