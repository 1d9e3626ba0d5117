//! Adapter implementations for task and history persistence.

pub mod memory;
pub mod postgres;
