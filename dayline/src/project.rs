//! Bucket view projection.
//!
//! Derives the renderable, sorted task list of a bucket from a position
//! model and the cached records. Projection is a pure derivation with
//! value equality: equal inputs produce an equal view, so UI layers can
//! compare against the previous view and skip a re-render. It caches
//! nothing of its own.

use dayline_proto::task::{BucketKey, TaskRecord};

use crate::cache::TaskCache;
use crate::positions::PositionModel;

/// The renderable state of one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketView {
    /// The bucket this view renders.
    pub bucket: BucketKey,
    /// Tasks in ascending order; each record's `bucket` and `order`
    /// fields reflect the model, not the possibly stale fetched values.
    pub tasks: Vec<TaskRecord>,
}

impl BucketView {
    /// Number of tasks in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the view renders no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Projects the sorted task list for a bucket.
///
/// The model decides membership and order; the cache supplies display
/// fields. Tasks the model tracks but the cache has no record for are
/// skipped — they are not renderable until their record arrives.
#[must_use]
pub fn project(model: &PositionModel, cache: &TaskCache, bucket: BucketKey) -> BucketView {
    let mut tasks = Vec::with_capacity(model.bucket_len(bucket));
    for (i, id) in model.bucket_tasks(bucket).iter().enumerate() {
        let Some(record) = cache.record(*id) else {
            continue;
        };
        let mut record = record.clone();
        record.bucket = bucket;
        record.order = u32::try_from(i).unwrap_or(u32::MAX);
        tasks.push(record);
    }
    BucketView { bucket, tasks }
}
