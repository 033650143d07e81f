//! Remote store contract and optimistic commit pipeline.
//!
//! The [`RemoteStore`] trait is the engine's only persistence boundary:
//! everything else in the crate is pure or read-only with respect to
//! the store. The pipeline in [`pipeline`] is the sole writer, and
//! [`optimistic`] carries the reusable snapshot/apply/commit/reconcile
//! shape it is built on.

pub mod optimistic;
pub mod pipeline;

pub use optimistic::{OptimisticWrite, Reconciled};
pub use pipeline::CommitPipeline;

use std::time::Duration;

use dayline_proto::batch::BatchUpdate;
use dayline_proto::task::{BucketKey, BucketRange, TaskId, TaskRecord};

/// Why the store refused a write (or a fetch failed).
///
/// Validation rejections and concurrent-edit conflicts surface the same
/// way: the engine rolls back and relies on the next fetch for truth,
/// never attempting an automatic merge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreRejection {
    /// The store does not hold one of the referenced tasks.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The batch conflicted with state that changed since load.
    #[error("placement conflict: {0}")]
    Conflict(String),

    /// The store could not be reached.
    #[error("store unreachable: {0}")]
    Unreachable(String),
}

/// Errors a commit can resolve with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// The store rejected the batch.
    #[error("store rejected batch: {0}")]
    Rejected(#[from] StoreRejection),

    /// The store did not answer within the commit timeout.
    #[error("commit timed out after {0:?}")]
    Timeout(Duration),
}

/// Async contract with the remote store.
///
/// Reads supply task records per bucket range; writes accept placement
/// batches that the store must apply atomically to preserve its own
/// density invariant.
pub trait RemoteStore: Send + Sync {
    /// Fetch all task records whose bucket lies in the range.
    fn fetch(
        &self,
        range: BucketRange,
    ) -> impl std::future::Future<Output = Result<Vec<TaskRecord>, StoreRejection>> + Send;

    /// Apply a placement batch atomically: either every tuple lands or
    /// none do.
    fn apply_batch(
        &self,
        batch: &BatchUpdate,
    ) -> impl std::future::Future<Output = Result<(), StoreRejection>> + Send;
}

/// Tuning for the commit pipeline.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    /// How long to wait for the store before treating a commit as
    /// failed.
    pub commit_timeout: Duration,
    /// Capacity of the engine event channel.
    pub event_buffer: usize,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            commit_timeout: Duration::from_secs(10),
            event_buffer: 64,
        }
    }
}

/// Events emitted by the pipeline for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A move was confirmed by the store.
    MoveCommitted {
        /// The moved task.
        task: TaskId,
        /// The buckets the move touched.
        buckets: Vec<BucketKey>,
    },
    /// A move failed and was rolled back; a transient, dismissable
    /// notification should be shown. The move is not retried
    /// automatically.
    MoveFailed {
        /// The task whose move failed.
        task: TaskId,
        /// Human-readable failure reason.
        reason: String,
    },
}
