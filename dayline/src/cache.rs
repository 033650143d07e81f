//! The client-side task cache.
//!
//! An explicit, typed cache passed by reference — never ambient global
//! state. It holds the raw records fetched from the store, the
//! committed position model derived from them, the set of buckets
//! pinned by an in-flight interaction, and the ranges already fetched.
//!
//! Pinning is the write-write conflict policy: while a bucket is
//! pinned, fetch merges may not overwrite its order, so an optimistic
//! local write wins until its commit pipeline resolves.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use dayline_proto::task::{BucketKey, BucketRange, TaskId, TaskRecord};

use crate::positions::PositionModel;

/// Shared handle to the cache. Locks are short-lived and never held
/// across a suspension point.
pub type SharedCache = Arc<RwLock<TaskCache>>;

/// Creates a fresh shared cache handle.
#[must_use]
pub fn shared() -> SharedCache {
    Arc::new(RwLock::new(TaskCache::new()))
}

/// Locally materialized task state.
#[derive(Debug, Default)]
pub struct TaskCache {
    records: HashMap<TaskId, TaskRecord>,
    committed: PositionModel,
    pinned: HashSet<BucketKey>,
    fetched: HashSet<BucketRange>,
    committing: Option<TaskId>,
}

impl TaskCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrates the cache from an initial fetch, replacing the
    /// committed model for the fetched range.
    pub fn hydrate(&mut self, range: BucketRange, records: Vec<TaskRecord>) {
        self.committed.merge_range(range, &records, &self.pinned);
        for record in records {
            self.records.insert(record.id, record);
        }
        self.fetched.insert(range);
    }

    /// Merges a background prefetch.
    ///
    /// Display fields always refresh; placements merge through
    /// [`PositionModel::merge_range`], which leaves pinned buckets (and
    /// tasks they own) untouched.
    pub fn merge_prefetch(&mut self, range: BucketRange, records: Vec<TaskRecord>) {
        tracing::debug!(count = records.len(), "merging prefetched records");
        self.committed.merge_range(range, &records, &self.pinned);
        for record in records {
            self.records.insert(record.id, record);
        }
        self.fetched.insert(range);
    }

    /// The committed position model.
    #[must_use]
    pub const fn committed(&self) -> &PositionModel {
        &self.committed
    }

    /// Mutable access to the committed model, for the commit pipeline.
    pub const fn committed_mut(&mut self) -> &mut PositionModel {
        &mut self.committed
    }

    /// The raw record for a task, if cached.
    #[must_use]
    pub fn record(&self, id: TaskId) -> Option<&TaskRecord> {
        self.records.get(&id)
    }

    /// Pins buckets against fetch overwrites.
    pub fn pin(&mut self, buckets: &[BucketKey]) {
        self.pinned.extend(buckets.iter().copied());
    }

    /// Releases previously pinned buckets.
    pub fn unpin(&mut self, buckets: &[BucketKey]) {
        for bucket in buckets {
            self.pinned.remove(bucket);
        }
    }

    /// Whether a bucket currently holds an outstanding local write.
    #[must_use]
    pub fn is_pinned(&self, bucket: BucketKey) -> bool {
        self.pinned.contains(&bucket)
    }

    /// The pinned bucket set.
    #[must_use]
    pub const fn pinned(&self) -> &HashSet<BucketKey> {
        &self.pinned
    }

    /// Whether a range has already been fetched.
    #[must_use]
    pub fn has_fetched(&self, range: BucketRange) -> bool {
        self.fetched.contains(&range)
    }

    /// The task whose move is currently being committed, if any.
    #[must_use]
    pub const fn committing_task(&self) -> Option<TaskId> {
        self.committing
    }

    /// Marks a task's move as committing (the outbound `isCommitting`
    /// flag for the UI layer).
    pub fn set_committing(&mut self, task: Option<TaskId>) {
        self.committing = task;
    }
}
