//! Shared data model for the `Dayline` planner engine and store.

pub mod batch;
pub mod codec;
pub mod task;
