//! The drag controller: gesture events in, committed moves out.
//!
//! On gesture start the controller clones the committed model; that
//! clone is both the tentative state the projector renders during the
//! gesture and the pre-drag snapshot a cancel falls back to (cancel
//! simply drops it). Gesture updates run resolver and reorder planning
//! synchronously, so the model only ever reflects the latest candidate.

use dayline_proto::task::{BucketKey, BucketRange, Placement, TaskId};
use tokio::sync::mpsc;

use crate::cache::SharedCache;
use crate::positions::{PositionError, PositionModel};
use crate::project::{self, BucketView};
use crate::reorder;
use crate::resolve::{self, GridMetrics, PointerOffset};
use crate::sync::{CommitError, CommitPipeline, EngineEvent, RemoteStore, StoreRejection, SyncPolicy};

use super::{DragError, DragPhase, PendingMove};

/// How a finished drag resolved.
#[derive(Debug)]
pub enum DropOutcome {
    /// The task was dropped where it started; nothing was written.
    NoChange,
    /// The store confirmed the move.
    Committed,
    /// The store refused or timed out; the local view was rolled back
    /// to the pre-move state.
    RolledBack(CommitError),
}

/// Drives the drag lifecycle against a shared cache and a remote store.
///
/// One controller instance means one possible pending move, matching
/// the single-active-pointer model: starting a second drag while one is
/// in progress (or its commit is in flight) is an error.
pub struct DragController<S: RemoteStore> {
    cache: SharedCache,
    pipeline: CommitPipeline<S>,
    phase: DragPhase,
    pending: Option<PendingMove>,
    tentative: Option<PositionModel>,
}

impl<S: RemoteStore> DragController<S> {
    /// Creates a controller and the engine event receiver for the UI
    /// layer.
    #[must_use]
    pub fn new(
        cache: SharedCache,
        store: S,
        policy: SyncPolicy,
    ) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (pipeline, event_rx) = CommitPipeline::new(store, policy);
        (
            Self {
                cache,
                pipeline,
                phase: DragPhase::Idle,
                pending: None,
                tentative: None,
            },
            event_rx,
        )
    }

    /// The current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.phase
    }

    /// The in-flight pending move, if a gesture is active.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    /// The shared cache handle this controller operates on.
    #[must_use]
    pub const fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Whether the given task's move is currently being committed.
    #[must_use]
    pub fn is_committing(&self, task: TaskId) -> bool {
        self.cache.read().committing_task() == Some(task)
    }

    /// Loads or prefetches a bucket range through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the store rejection if the fetch fails.
    pub async fn fetch_range(&self, range: BucketRange) -> Result<usize, StoreRejection> {
        self.pipeline.fetch_into(&self.cache, range).await
    }

    /// Projects the renderable view of a bucket.
    ///
    /// During a gesture this reads the tentative model, so every frame
    /// reflects the latest candidate; otherwise the committed model.
    #[must_use]
    pub fn view(&self, bucket: BucketKey) -> BucketView {
        let cache = self.cache.read();
        match &self.tentative {
            Some(model) => project::project(model, &cache, bucket),
            None => project::project(cache.committed(), &cache, bucket),
        }
    }

    /// Starts a drag for `task`, returning its origin placement.
    ///
    /// # Errors
    ///
    /// [`DragError::DragInProgress`] or [`DragError::CommitInFlight`]
    /// if the state machine is not idle; [`DragError::UnknownTask`] if
    /// the committed model does not track the task.
    pub fn drag_start(&mut self, task: TaskId) -> Result<Placement, DragError> {
        match self.phase {
            DragPhase::Dragging => return Err(DragError::DragInProgress),
            DragPhase::Committing => return Err(DragError::CommitInFlight),
            DragPhase::Idle => {}
        }

        let mut cache = self.cache.write();
        let origin = cache
            .committed()
            .placement(task)
            .ok_or(DragError::UnknownTask(task))?;

        // The clone is simultaneously the tentative render state and
        // the pre-drag snapshot cancel restores (by dropping it).
        self.tentative = Some(cache.committed().clone());
        self.pending = Some(PendingMove {
            task,
            origin,
            candidate: origin,
        });
        cache.pin(&[origin.bucket]);
        self.phase = DragPhase::Dragging;
        tracing::debug!(%task, origin = %origin.bucket, "drag started");
        Ok(origin)
    }

    /// Processes a continuous gesture update.
    ///
    /// `window` is the visible bucket window, left to right; the x axis
    /// resolves into it and the y axis into the resolved bucket's task
    /// list. Returns the task's placement after the update.
    ///
    /// # Errors
    ///
    /// [`DragError::NoActiveDrag`] outside a gesture,
    /// [`DragError::EmptyWindow`] if `window` is empty.
    pub fn drag_update(
        &mut self,
        offset: PointerOffset,
        metrics: &GridMetrics,
        window: &[BucketKey],
    ) -> Result<Placement, DragError> {
        if self.phase != DragPhase::Dragging {
            return Err(DragError::NoActiveDrag);
        }
        if window.is_empty() {
            return Err(DragError::EmptyWindow);
        }

        let index = resolve::bucket_index_at(offset.x, metrics).min(window.len() - 1);
        let bucket = window[index];
        let len = self
            .tentative
            .as_ref()
            .map_or(0, |model| model.bucket_len(bucket));
        let order = resolve::order_at(offset.y, metrics, len);
        self.apply_candidate(Placement::new(bucket, order))
    }

    /// Processes a discrete drop-index update from a list platform.
    ///
    /// # Errors
    ///
    /// [`DragError::NoActiveDrag`] outside a gesture.
    pub fn drag_update_index(
        &mut self,
        bucket: BucketKey,
        index: usize,
    ) -> Result<Placement, DragError> {
        if self.phase != DragPhase::Dragging {
            return Err(DragError::NoActiveDrag);
        }
        let len = self
            .tentative
            .as_ref()
            .map_or(0, |model| model.bucket_len(bucket));
        let order = resolve::resolve_list_index(index, len);
        self.apply_candidate(Placement::new(bucket, order))
    }

    /// Ends the gesture and commits a non-no-op move.
    ///
    /// Runs the pipeline to completion: on success the committed model
    /// keeps the new order; on failure it has already been rolled back.
    /// Either way the state machine returns to idle.
    ///
    /// # Errors
    ///
    /// [`DragError::NoActiveDrag`] if no gesture is active.
    pub async fn drag_end(&mut self) -> Result<DropOutcome, DragError> {
        if self.phase != DragPhase::Dragging {
            return Err(DragError::NoActiveDrag);
        }
        let Some(pending) = self.pending.take() else {
            return Err(DragError::NoActiveDrag);
        };
        let Some(tentative) = self.tentative.take() else {
            return Err(DragError::NoActiveDrag);
        };

        let mut touched = vec![pending.origin.bucket];
        if pending.candidate.bucket != pending.origin.bucket {
            touched.push(pending.candidate.bucket);
        }

        if pending.candidate == pending.origin {
            self.cache.write().unpin(&touched);
            self.phase = DragPhase::Idle;
            return Ok(DropOutcome::NoChange);
        }

        self.phase = DragPhase::Committing;
        let slice = tentative.snapshot_buckets(&touched);
        let result = self
            .pipeline
            .commit_move(&self.cache, pending.task, &slice)
            .await;
        self.phase = DragPhase::Idle;

        match result {
            Ok(()) => Ok(DropOutcome::Committed),
            Err(error) => Ok(DropOutcome::RolledBack(error)),
        }
    }

    /// Aborts the gesture (platform interruption, drop outside any
    /// valid target) and restores the exact pre-drag state.
    ///
    /// # Errors
    ///
    /// [`DragError::NoActiveDrag`] if no gesture is active.
    pub fn drag_cancel(&mut self) -> Result<(), DragError> {
        if self.phase != DragPhase::Dragging {
            return Err(DragError::NoActiveDrag);
        }
        let pending = self.pending.take();
        // Dropping the tentative clone is the rollback: the committed
        // model was never touched during the gesture.
        self.tentative = None;
        if let Some(pending) = pending {
            let mut cache = self.cache.write();
            cache.unpin(&[pending.origin.bucket, pending.candidate.bucket]);
            tracing::debug!(task = %pending.task, "drag cancelled");
        }
        self.phase = DragPhase::Idle;
        Ok(())
    }

    /// Plans and applies the latest candidate to the tentative model,
    /// keeping the pinned bucket set at `{origin, candidate}`.
    fn apply_candidate(&mut self, target: Placement) -> Result<Placement, DragError> {
        let Some(pending) = self.pending.as_mut() else {
            return Err(DragError::NoActiveDrag);
        };
        let Some(tentative) = self.tentative.as_mut() else {
            return Err(DragError::NoActiveDrag);
        };

        if target == pending.candidate {
            return Ok(pending.candidate);
        }

        match reorder::plan_move(tentative, pending.task, target) {
            Ok(Some(slice)) => tentative.apply_slice(&slice),
            Ok(None) => {}
            Err(PositionError::UnknownTask(id)) => return Err(DragError::UnknownTask(id)),
        }

        let effective = tentative
            .placement(pending.task)
            .ok_or(DragError::UnknownTask(pending.task))?;
        let previous = pending.candidate.bucket;
        pending.candidate = effective;

        if previous != effective.bucket {
            let origin = pending.origin.bucket;
            let mut cache = self.cache.write();
            if previous != origin {
                cache.unpin(&[previous]);
            }
            cache.pin(&[effective.bucket]);
        }
        Ok(effective)
    }
}
