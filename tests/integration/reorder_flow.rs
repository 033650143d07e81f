//! End-to-end reorder flows: drag gestures through the controller,
//! commits through the pipeline, persistence in the reference store.
//!
//! Covers same-bucket reordering and cross-bucket moves, driven both by
//! continuous pointer offsets and by discrete list indices.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::sync::Arc;

use chrono::NaiveDate;

use dayline::cache;
use dayline::drag::{DragController, DragPhase, DropOutcome};
use dayline::resolve::{GridMetrics, PointerOffset};
use dayline::sync::{RemoteStore, StoreRejection, SyncPolicy};
use dayline_proto::batch::BatchUpdate;
use dayline_proto::task::{BucketKey, BucketRange, Placement, TaskId, TaskRecord};
use dayline_store::{StoreError, TaskStore};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Adapts the reference [`TaskStore`] to the engine's store contract.
struct StoreAdapter(Arc<TaskStore>);

impl RemoteStore for StoreAdapter {
    async fn fetch(&self, range: BucketRange) -> Result<Vec<TaskRecord>, StoreRejection> {
        Ok(self.0.fetch_range(range).await)
    }

    async fn apply_batch(&self, batch: &BatchUpdate) -> Result<(), StoreRejection> {
        self.0.apply_batch(batch).await.map_err(|e| match e {
            StoreError::TaskNotFound(id) => StoreRejection::TaskNotFound(id),
            StoreError::Unavailable => StoreRejection::Unreachable(e.to_string()),
            StoreError::DensityViolation { .. } | StoreError::EmptyBatch => {
                StoreRejection::Conflict(e.to_string())
            }
        })
    }
}

fn day(s: &str) -> BucketKey {
    BucketKey::Day(s.parse::<NaiveDate>().unwrap())
}

fn week_range() -> BucketRange {
    BucketRange::days(
        "2024-01-01".parse().unwrap(),
        "2024-01-07".parse().unwrap(),
    )
}

fn record(bucket: BucketKey, order: u32, title: &str) -> TaskRecord {
    TaskRecord {
        id: TaskId::new(),
        bucket,
        order,
        title: title.to_string(),
        done: false,
        created_at: 0,
    }
}

/// Grid of 100x40 cells, two visible day columns.
fn metrics() -> GridMetrics {
    GridMetrics::new(100.0, 40.0, 2).unwrap()
}

/// Seeds the store with A, B, C on day one and X on day two, then wires
/// a controller hydrated from it.
async fn planner() -> (
    Arc<TaskStore>,
    DragController<StoreAdapter>,
    Vec<TaskId>,
    Vec<BucketKey>,
) {
    let store = Arc::new(TaskStore::new());
    let window = vec![day("2024-01-01"), day("2024-01-02")];
    let records = vec![
        record(window[0], 0, "A"),
        record(window[0], 1, "B"),
        record(window[0], 2, "C"),
        record(window[1], 0, "X"),
    ];
    let ids: Vec<TaskId> = records.iter().map(|r| r.id).collect();
    store.seed(records).await;

    let shared = cache::shared();
    let (controller, _events) = DragController::new(
        shared,
        StoreAdapter(Arc::clone(&store)),
        SyncPolicy::default(),
    );
    let fetched = controller.fetch_range(week_range()).await.unwrap();
    assert_eq!(fetched, 4);
    (store, controller, ids, window)
}

/// Orders in the store for a bucket, sorted, as `(title, order)` pairs.
async fn store_bucket(store: &TaskStore, bucket: BucketKey) -> Vec<(String, u32)> {
    let range = week_range();
    store
        .fetch_range(range)
        .await
        .into_iter()
        .filter(|r| r.bucket == bucket)
        .map(|r| (r.title, r.order))
        .collect()
}

// ---------------------------------------------------------------------------
// Same-bucket reorder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drag_last_task_to_top_shifts_neighbors() {
    let (store, mut controller, ids, window) = planner().await;

    // C from the bottom of day one to the top.
    controller.drag_start(ids[2]).unwrap();
    let candidate = controller
        .drag_update(PointerOffset::new(0.0, 0.0), &metrics(), &window)
        .unwrap();
    assert_eq!(candidate, Placement::new(window[0], 0));

    let outcome = controller.drag_end().await.unwrap();
    assert!(matches!(outcome, DropOutcome::Committed));

    // Local committed order and store agree: [C, A, B].
    let cache = controller.cache().read();
    assert_eq!(
        cache.committed().bucket_tasks(window[0]),
        &[ids[2], ids[0], ids[1]]
    );
    drop(cache);
    assert_eq!(
        store_bucket(&store, window[0]).await,
        vec![
            ("C".to_string(), 0),
            ("A".to_string(), 1),
            ("B".to_string(), 2)
        ]
    );
}

#[tokio::test]
async fn intermediate_candidates_leave_no_trace() {
    let (store, mut controller, ids, window) = planner().await;

    // Wander across several candidates before settling.
    controller.drag_start(ids[0]).unwrap();
    for y in [90.0, 10.0, 50.0] {
        controller
            .drag_update(PointerOffset::new(0.0, y), &metrics(), &window)
            .unwrap();
    }
    let outcome = controller.drag_end().await.unwrap();
    assert!(matches!(outcome, DropOutcome::Committed));

    // Only the final candidate (A at index 1) persisted: [B, A, C].
    assert_eq!(
        store_bucket(&store, window[0]).await,
        vec![
            ("B".to_string(), 0),
            ("A".to_string(), 1),
            ("C".to_string(), 2)
        ]
    );
}

#[tokio::test]
async fn drop_on_own_slot_writes_nothing() {
    let (store, mut controller, ids, window) = planner().await;

    controller.drag_start(ids[1]).unwrap();
    controller
        .drag_update(PointerOffset::new(0.0, 40.0), &metrics(), &window)
        .unwrap();
    let outcome = controller.drag_end().await.unwrap();
    assert!(matches!(outcome, DropOutcome::NoChange));

    assert_eq!(
        store_bucket(&store, window[0]).await,
        vec![
            ("A".to_string(), 0),
            ("B".to_string(), 1),
            ("C".to_string(), 2)
        ]
    );
}

// ---------------------------------------------------------------------------
// Cross-bucket move
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cross_bucket_move_keeps_both_buckets_dense() {
    let (store, mut controller, ids, window) = planner().await;

    // B from the middle of day one to the top of day two.
    controller.drag_start(ids[1]).unwrap();
    let candidate = controller
        .drag_update(PointerOffset::new(120.0, 0.0), &metrics(), &window)
        .unwrap();
    assert_eq!(candidate, Placement::new(window[1], 0));

    let outcome = controller.drag_end().await.unwrap();
    assert!(matches!(outcome, DropOutcome::Committed));

    // Origin closed its gap, destination shifted down.
    assert_eq!(
        store_bucket(&store, window[0]).await,
        vec![("A".to_string(), 0), ("C".to_string(), 1)]
    );
    assert_eq!(
        store_bucket(&store, window[1]).await,
        vec![("B".to_string(), 0), ("X".to_string(), 1)]
    );
}

#[tokio::test]
async fn pointer_past_bucket_end_appends() {
    let (store, mut controller, ids, window) = planner().await;

    // Far below the single task on day two: insert-at-end.
    controller.drag_start(ids[0]).unwrap();
    let candidate = controller
        .drag_update(PointerOffset::new(150.0, 900.0), &metrics(), &window)
        .unwrap();
    assert_eq!(candidate, Placement::new(window[1], 1));

    controller.drag_end().await.unwrap();
    assert_eq!(
        store_bucket(&store, window[1]).await,
        vec![("X".to_string(), 0), ("A".to_string(), 1)]
    );
}

#[tokio::test]
async fn discrete_index_drop_matches_pointer_drop() {
    let (store, mut controller, ids, window) = planner().await;

    controller.drag_start(ids[2]).unwrap();
    let candidate = controller.drag_update_index(window[1], 0).unwrap();
    assert_eq!(candidate, Placement::new(window[1], 0));

    controller.drag_end().await.unwrap();
    assert_eq!(
        store_bucket(&store, window[1]).await,
        vec![("C".to_string(), 0), ("X".to_string(), 1)]
    );
}

// ---------------------------------------------------------------------------
// Views during the gesture
// ---------------------------------------------------------------------------

#[tokio::test]
async fn view_tracks_tentative_then_committed() {
    let (_store, mut controller, ids, window) = planner().await;

    controller.drag_start(ids[2]).unwrap();
    controller
        .drag_update(PointerOffset::new(0.0, 0.0), &metrics(), &window)
        .unwrap();

    // Mid-gesture the view renders the tentative order.
    let during = controller.view(window[0]);
    assert_eq!(during.tasks[0].id, ids[2]);
    assert_eq!(during.tasks[0].order, 0);
    assert_eq!(controller.phase(), DragPhase::Dragging);

    controller.drag_end().await.unwrap();

    // After the drop the committed view shows the same order.
    let after = controller.view(window[0]);
    assert_eq!(after.tasks[0].id, ids[2]);
    assert_eq!(controller.phase(), DragPhase::Idle);
}

#[tokio::test]
async fn cancel_mid_gesture_restores_view() {
    let (store, mut controller, ids, window) = planner().await;

    controller.drag_start(ids[0]).unwrap();
    controller
        .drag_update(PointerOffset::new(120.0, 0.0), &metrics(), &window)
        .unwrap();
    controller.drag_cancel().unwrap();

    let view = controller.view(window[0]);
    let titles: Vec<&str> = view.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert_eq!(store_bucket(&store, window[1]).await.len(), 1);
}
