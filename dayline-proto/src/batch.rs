//! Batch placement updates — the atomic write unit of the store contract.
//!
//! A reorder touches one or two buckets, and every task whose order
//! changed must travel in the same batch; a partial batch would break
//! the density invariant on the store's copy. The store applies a batch
//! all-or-nothing.

use serde::{Deserialize, Serialize};

use crate::task::{BucketKey, Placement, TaskId};

/// One changed `(task, bucket, order)` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementUpdate {
    /// The task being repositioned.
    pub id: TaskId,
    /// Its new bucket.
    pub bucket: BucketKey,
    /// Its new zero-based rank within the bucket.
    pub order: u32,
}

impl PlacementUpdate {
    /// Creates an update from a task id and its new placement.
    #[must_use]
    pub const fn new(id: TaskId, placement: Placement) -> Self {
        Self {
            id,
            bucket: placement.bucket,
            order: placement.order,
        }
    }

    /// Returns the target placement of this update.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        Placement::new(self.bucket, self.order)
    }
}

/// A set of placement updates the store must apply atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpdate {
    /// Every changed tuple across all touched buckets.
    pub updates: Vec<PlacementUpdate>,
}

impl BatchUpdate {
    /// Creates a batch from a list of updates.
    #[must_use]
    pub const fn new(updates: Vec<PlacementUpdate>) -> Self {
        Self { updates }
    }

    /// Whether the batch carries no updates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// The distinct buckets this batch touches, in sorted order.
    #[must_use]
    pub fn touched_buckets(&self) -> Vec<BucketKey> {
        let mut buckets: Vec<BucketKey> = self.updates.iter().map(|u| u.bucket).collect();
        buckets.sort_unstable();
        buckets.dedup();
        buckets
    }
}
