//! Drag interaction lifecycle.
//!
//! A drag runs `Idle → Dragging → (Committing | cancelled) → Idle`, with
//! exactly one pending move alive at a time. The controller in
//! [`controller`] owns the tentative position model for the duration of
//! the gesture and hands the finished move to the commit pipeline.

pub mod controller;

pub use controller::{DragController, DropOutcome};

use dayline_proto::task::{Placement, TaskId};
use thiserror::Error;

/// Lifecycle phase of the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// No pending move; the position model is the last committed state.
    #[default]
    Idle,
    /// A gesture is in progress; the position model is tentative.
    Dragging,
    /// The gesture ended and the commit pipeline is running.
    Committing,
}

/// The ephemeral record of an in-flight drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    /// The task being dragged.
    pub task: TaskId,
    /// Where the task sat when the gesture started.
    pub origin: Placement,
    /// The most recent resolved candidate.
    pub candidate: Placement,
}

/// Errors raised by drag lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DragError {
    /// No drag is in progress.
    #[error("no drag in progress")]
    NoActiveDrag,

    /// A drag is already in progress; only one pending move may exist.
    #[error("a drag is already in progress")]
    DragInProgress,

    /// The previous move's commit has not resolved yet.
    #[error("a commit is still in flight")]
    CommitInFlight,

    /// The dragged task is not in the cached position model.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// The visible bucket window is empty.
    #[error("visible bucket window is empty")]
    EmptyWindow,
}
