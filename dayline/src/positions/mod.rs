//! The position model: which bucket every task lives in, and its dense
//! rank within that bucket.
//!
//! The model is the single mutable surface of the engine. The reorder
//! algorithm plans against it, the projector derives views from it, and
//! the commit pipeline snapshots and restores slices of it.

pub mod model;

pub use model::{BucketSlice, PositionModel};

use dayline_proto::task::TaskId;
use thiserror::Error;

/// Errors that can occur when planning against the position model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    /// The task is not present in the model.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
}
