//! Position model storage and slice operations.
//!
//! Order is structural: each bucket holds an ordered `Vec<TaskId>` and a
//! task's order is its index, so the density invariant (orders form an
//! unbroken `0..n-1`) cannot be violated by construction. A reverse
//! index gives O(1) bucket lookup per task.

use std::collections::{HashMap, HashSet};

use dayline_proto::batch::PlacementUpdate;
use dayline_proto::task::{BucketKey, BucketRange, Placement, TaskId, TaskRecord};

/// A replacement slice of the position model: full ordered membership
/// for a set of buckets.
///
/// Used both as the reorder algorithm's output (the new state of the
/// touched buckets) and as a pre-move snapshot for rollback — restoring
/// a snapshot is the same operation as applying a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketSlice {
    entries: Vec<(BucketKey, Vec<TaskId>)>,
}

impl BucketSlice {
    /// Creates a slice from explicit bucket memberships.
    #[must_use]
    pub fn new(entries: Vec<(BucketKey, Vec<TaskId>)>) -> Self {
        Self { entries }
    }

    /// The bucket keys this slice covers.
    pub fn keys(&self) -> impl Iterator<Item = BucketKey> + '_ {
        self.entries.iter().map(|(b, _)| *b)
    }

    /// The ordered membership recorded for a bucket, if covered.
    #[must_use]
    pub fn get(&self, bucket: BucketKey) -> Option<&[TaskId]> {
        self.entries
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, members)| members.as_slice())
    }

    /// Iterates over `(bucket, members)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (BucketKey, &[TaskId])> {
        self.entries.iter().map(|(b, m)| (*b, m.as_slice()))
    }

    /// Whether the slice covers no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The placement of every task in the slice.
    fn placements(&self) -> HashMap<TaskId, Placement> {
        let mut placements = HashMap::new();
        for (bucket, members) in &self.entries {
            for (i, id) in members.iter().enumerate() {
                placements.insert(*id, Placement::new(*bucket, order_of(i)));
            }
        }
        placements
    }
}

/// Maps every task to its bucket and rank.
///
/// Stable states of the model (between interactions, and as the
/// committed end-state of any reorder) always satisfy:
/// 1. per-bucket orders are a dense `0..n-1` permutation,
/// 2. every task belongs to exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionModel {
    buckets: HashMap<BucketKey, Vec<TaskId>>,
    index: HashMap<TaskId, BucketKey>,
}

/// Converts a vector index to an order value. Bucket sizes are bounded
/// by what fits on a timeline, far below `u32::MAX`.
fn order_of(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

impl PositionModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from store records.
    ///
    /// Records are grouped by bucket and sorted by `(order, id)`. If a
    /// bucket's fetched orders are not dense the model self-heals by
    /// keeping the sorted sequence and re-deriving dense ranks.
    #[must_use]
    pub fn hydrate(records: &[TaskRecord]) -> Self {
        let mut model = Self::new();
        let mut grouped: HashMap<BucketKey, Vec<(u32, TaskId)>> = HashMap::new();
        for record in records {
            grouped
                .entry(record.bucket)
                .or_default()
                .push((record.order, record.id));
        }
        for (bucket, mut members) in grouped {
            members.sort_unstable();
            let dense = members
                .iter()
                .enumerate()
                .all(|(i, (order, _))| *order == order_of(i));
            if !dense {
                tracing::warn!(%bucket, "re-deriving dense orders from fetched records");
            }
            let ordered: Vec<TaskId> = members.into_iter().map(|(_, id)| id).collect();
            for id in &ordered {
                model.index.insert(*id, bucket);
            }
            model.buckets.insert(bucket, ordered);
        }
        model
    }

    /// Whether the model tracks the given task.
    #[must_use]
    pub fn contains(&self, task: TaskId) -> bool {
        self.index.contains_key(&task)
    }

    /// The placement of a task, if tracked.
    #[must_use]
    pub fn placement(&self, task: TaskId) -> Option<Placement> {
        let bucket = *self.index.get(&task)?;
        let order = self
            .buckets
            .get(&bucket)?
            .iter()
            .position(|id| *id == task)?;
        Some(Placement::new(bucket, order_of(order)))
    }

    /// The ordered members of a bucket (empty for unknown buckets).
    #[must_use]
    pub fn bucket_tasks(&self, bucket: BucketKey) -> &[TaskId] {
        self.buckets.get(&bucket).map_or(&[], Vec::as_slice)
    }

    /// The number of tasks in a bucket.
    #[must_use]
    pub fn bucket_len(&self, bucket: BucketKey) -> usize {
        self.buckets.get(&bucket).map_or(0, Vec::len)
    }

    /// The total number of tracked tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.index.len()
    }

    /// The bucket keys currently holding at least one task.
    pub fn bucket_keys(&self) -> impl Iterator<Item = BucketKey> + '_ {
        self.buckets.keys().copied()
    }

    /// Takes a restorable snapshot of the given buckets.
    #[must_use]
    pub fn snapshot_buckets(&self, keys: &[BucketKey]) -> BucketSlice {
        let mut entries = Vec::with_capacity(keys.len());
        let mut seen = HashSet::new();
        for key in keys {
            if seen.insert(*key) {
                entries.push((*key, self.bucket_tasks(*key).to_vec()));
            }
        }
        BucketSlice::new(entries)
    }

    /// Installs a slice, replacing the membership of every bucket it
    /// covers and leaving all other buckets untouched.
    ///
    /// Incoming members are detached from wherever they currently sit,
    /// so a cross-bucket slice moves tasks rather than duplicating them.
    pub fn apply_slice(&mut self, slice: &BucketSlice) {
        // Drop the index entries of the buckets being replaced.
        for bucket in slice.keys() {
            if let Some(old) = self.buckets.remove(&bucket) {
                for id in old {
                    if self.index.get(&id) == Some(&bucket) {
                        self.index.remove(&id);
                    }
                }
            }
        }
        for (bucket, members) in slice.iter() {
            for id in members {
                self.detach(*id);
            }
            for id in members {
                self.index.insert(*id, bucket);
            }
            if !members.is_empty() {
                self.buckets.insert(bucket, members.to_vec());
            }
        }
        self.debug_check_consistency();
    }

    /// Merges fetched records for a range into the model.
    ///
    /// Merge-only with respect to in-flight writes: buckets in `pinned`
    /// are skipped entirely, and a task whose local bucket is pinned is
    /// never relocated by a fetch. A record that targets a pinned
    /// bucket is deferred instead: the task stays at its current local
    /// placement until the pin releases, rather than dropping out of
    /// the model. Every other bucket inside the range is rebuilt from
    /// the records (which covers remote additions, removals, and
    /// moves).
    pub fn merge_range(
        &mut self,
        range: BucketRange,
        records: &[TaskRecord],
        pinned: &HashSet<BucketKey>,
    ) {
        let mut incoming: HashMap<BucketKey, Vec<(u32, TaskId)>> = HashMap::new();
        let mut deferred: HashSet<TaskId> = HashSet::new();
        for record in records {
            if !range.contains(&record.bucket) {
                continue;
            }
            if pinned.contains(&record.bucket) {
                if self.index.contains_key(&record.id) {
                    deferred.insert(record.id);
                }
                continue;
            }
            if self
                .index
                .get(&record.id)
                .is_some_and(|b| pinned.contains(b))
            {
                // The optimistic local write owns this task until its
                // commit resolves.
                continue;
            }
            incoming
                .entry(record.bucket)
                .or_default()
                .push((record.order, record.id));
        }

        let mut targets: HashSet<BucketKey> = incoming.keys().copied().collect();
        targets.extend(
            self.buckets
                .keys()
                .filter(|b| range.contains(b) && !pinned.contains(b))
                .copied(),
        );

        let mut entries = Vec::with_capacity(targets.len());
        for bucket in targets {
            let mut members = incoming.remove(&bucket).unwrap_or_default();
            members.sort_unstable();
            let mut ordered: Vec<TaskId> = members.into_iter().map(|(_, id)| id).collect();
            // Deferred tasks keep their local slot in the rebuilt bucket.
            for (i, id) in self.bucket_tasks(bucket).iter().enumerate() {
                if deferred.contains(id) && !ordered.contains(id) {
                    ordered.insert(i.min(ordered.len()), *id);
                }
            }
            entries.push((bucket, ordered));
        }
        self.apply_slice(&BucketSlice::new(entries));
    }

    /// The `(task, bucket, order)` tuples that differ from a pre-move
    /// snapshot, across exactly the buckets the snapshot covers.
    ///
    /// This is the payload of the batch update: both the moved task and
    /// every neighbor whose rank shifted, in both touched buckets.
    #[must_use]
    pub fn diff_since(&self, before: &BucketSlice) -> Vec<PlacementUpdate> {
        let previous = before.placements();
        let mut updates = Vec::new();
        for bucket in before.keys() {
            for (i, id) in self.bucket_tasks(bucket).iter().enumerate() {
                let now = Placement::new(bucket, order_of(i));
                if previous.get(id) != Some(&now) {
                    updates.push(PlacementUpdate::new(*id, now));
                }
            }
        }
        updates
    }

    /// Removes a task from its current bucket, if tracked.
    fn detach(&mut self, task: TaskId) {
        if let Some(bucket) = self.index.remove(&task) {
            if let Some(members) = self.buckets.get_mut(&bucket) {
                members.retain(|id| *id != task);
                if members.is_empty() {
                    self.buckets.remove(&bucket);
                }
            }
        }
    }

    #[cfg(debug_assertions)]
    fn debug_check_consistency(&self) {
        let total: usize = self.buckets.values().map(Vec::len).sum();
        debug_assert_eq!(total, self.index.len(), "index out of sync with buckets");
        for (bucket, members) in &self.buckets {
            for id in members {
                debug_assert_eq!(
                    self.index.get(id),
                    Some(bucket),
                    "task {id} indexed to the wrong bucket"
                );
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_consistency(&self) {}
}
