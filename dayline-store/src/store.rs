//! Atomic task store with per-bucket density validation.
//!
//! The [`TaskStore`] validates a whole batch against the post-apply
//! state before touching anything, so a rejected batch leaves the store
//! exactly as it was. Thread-safe via [`RwLock`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use dayline_proto::batch::BatchUpdate;
use dayline_proto::task::{BucketKey, BucketRange, TaskId, TaskRecord};

/// Errors a batch application can be rejected with.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// A batch referenced a task the store does not hold.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Applying the batch would leave a bucket with gapped or duplicate
    /// order values.
    #[error("order values in bucket {bucket} would not be dense")]
    DensityViolation {
        /// The bucket whose post-apply orders are invalid.
        bucket: BucketKey,
    },

    /// The batch carried no updates.
    #[error("batch carried no updates")]
    EmptyBatch,

    /// The store refused the write (injected failure or shutdown).
    #[error("store unavailable")]
    Unavailable,
}

/// In-memory authoritative task store.
///
/// Batches are all-or-nothing: validation runs against the simulated
/// post-apply state of every touched bucket, and only a fully valid
/// batch is committed.
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,
    fail_next: AtomicBool,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Seeds the store with a set of records, replacing any existing
    /// records with the same ids.
    pub async fn seed(&self, records: Vec<TaskRecord>) {
        let mut tasks = self.tasks.write().await;
        for record in records {
            tasks.insert(record.id, record);
        }
    }

    /// Inserts or replaces a single record.
    pub async fn insert(&self, record: TaskRecord) {
        self.tasks.write().await.insert(record.id, record);
    }

    /// Returns a copy of the record for a task, if present.
    pub async fn task(&self, id: TaskId) -> Option<TaskRecord> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// Returns the number of records held.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Arms the store to reject the next batch with
    /// [`StoreError::Unavailable`]. Used to exercise rollback paths.
    pub fn fail_next_batch(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Fetches all records whose bucket lies in the given range, sorted
    /// by `(bucket, order)`.
    pub async fn fetch_range(&self, range: BucketRange) -> Vec<TaskRecord> {
        let tasks = self.tasks.read().await;
        let mut records: Vec<TaskRecord> = tasks
            .values()
            .filter(|r| range.contains(&r.bucket))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.bucket, r.order));
        records
    }

    /// Applies a placement batch atomically.
    ///
    /// Validation order: non-empty, every task exists, and every bucket
    /// touched by the batch is dense (`0..n-1`) after the simulated
    /// apply. Nothing is written unless all checks pass.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing the first rejected check.
    pub async fn apply_batch(&self, batch: &BatchUpdate) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            tracing::warn!("rejecting batch: store unavailable (injected)");
            return Err(StoreError::Unavailable);
        }
        if batch.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut tasks = self.tasks.write().await;

        for update in &batch.updates {
            if !tasks.contains_key(&update.id) {
                return Err(StoreError::TaskNotFound(update.id));
            }
        }

        // Simulated post-apply placements for every task.
        let mut post: HashMap<TaskId, (BucketKey, u32)> = tasks
            .iter()
            .map(|(id, r)| (*id, (r.bucket, r.order)))
            .collect();
        for update in &batch.updates {
            post.insert(update.id, (update.bucket, update.order));
        }

        for bucket in batch.touched_buckets() {
            let mut orders: Vec<u32> = post
                .values()
                .filter(|(b, _)| *b == bucket)
                .map(|(_, o)| *o)
                .collect();
            orders.sort_unstable();
            let dense = orders
                .iter()
                .enumerate()
                .all(|(i, o)| u32::try_from(i).is_ok_and(|i| i == *o));
            if !dense {
                tracing::warn!(%bucket, ?orders, "rejecting batch: density violation");
                return Err(StoreError::DensityViolation { bucket });
            }
        }

        for update in &batch.updates {
            if let Some(record) = tasks.get_mut(&update.id) {
                record.bucket = update.bucket;
                record.order = update.order;
            }
        }
        tracing::debug!(updates = batch.updates.len(), "batch applied");
        Ok(())
    }
}
