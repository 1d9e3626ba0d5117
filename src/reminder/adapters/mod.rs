//! Adapter implementations for user records and push delivery.

pub mod memory;
pub mod postgres;
pub mod relay;
