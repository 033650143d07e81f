//! The commit pipeline: the engine's only store writer.
//!
//! Bridges a finished reorder to the remote store. The tentative state
//! is frozen into the committed model synchronously, so the next render
//! already reflects the new order; the batch then travels to the store
//! with a timeout, and a refusal or timeout rolls the touched buckets
//! back to their pre-move snapshot. Buckets stay pinned for the whole
//! round-trip so a concurrent prefetch cannot overwrite the optimistic
//! order.

use tokio::sync::mpsc;

use dayline_proto::batch::BatchUpdate;
use dayline_proto::task::{BucketKey, BucketRange, TaskId};

use crate::cache::SharedCache;
use crate::positions::BucketSlice;

use super::optimistic::{self, OptimisticWrite, Reconciled};
use super::{CommitError, EngineEvent, RemoteStore, StoreRejection, SyncPolicy};

/// Persists reorders optimistically and reconciles store responses.
pub struct CommitPipeline<S: RemoteStore> {
    store: S,
    policy: SyncPolicy,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl<S: RemoteStore> CommitPipeline<S> {
    /// Creates a pipeline and the event receiver the UI layer should
    /// consume.
    #[must_use]
    pub fn new(store: S, policy: SyncPolicy) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (event_tx, event_rx) = mpsc::channel(policy.event_buffer.max(1));
        (
            Self {
                store,
                policy,
                event_tx,
            },
            event_rx,
        )
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fetches a range from the store and merges it into the cache.
    ///
    /// Used both for the initial load and for background prefetches of
    /// adjacent buckets; pinned buckets are merge-protected either way.
    /// Returns the number of fetched records.
    ///
    /// # Errors
    ///
    /// Returns the store's rejection if the fetch fails; the cache is
    /// left untouched.
    pub async fn fetch_into(
        &self,
        cache: &SharedCache,
        range: BucketRange,
    ) -> Result<usize, StoreRejection> {
        let records = self.store.fetch(range).await?;
        let count = records.len();
        cache.write().merge_prefetch(range, records);
        tracing::debug!(count, "fetched range into cache");
        Ok(count)
    }

    /// Commits a finished move.
    ///
    /// `tentative` is the final state of exactly the touched buckets.
    /// Steps:
    /// 1. snapshot those buckets, apply the tentative slice to the
    ///    committed model, and pin the buckets — all under one short
    ///    lock, so rendering never observes a half-applied move;
    /// 2. send the full diff (every shifted neighbor in every touched
    ///    bucket) as one batch;
    /// 3. on refusal or timeout, restore the snapshot into exactly
    ///    those buckets and emit [`EngineEvent::MoveFailed`].
    ///
    /// # Errors
    ///
    /// Returns the [`CommitError`] after local state has already been
    /// reconciled (rolled back); callers need no further recovery.
    pub async fn commit_move(
        &self,
        cache: &SharedCache,
        task: TaskId,
        tentative: &BucketSlice,
    ) -> Result<(), CommitError> {
        let touched: Vec<BucketKey> = tentative.keys().collect();

        let write = {
            let mut cache = cache.write();
            let snapshot = cache.committed().snapshot_buckets(&touched);
            cache.committed_mut().apply_slice(tentative);
            let updates = cache.committed().diff_since(&snapshot);
            if updates.is_empty() {
                // The candidate matched the committed state after all.
                // Release the buckets exactly as a resolved commit
                // would, so pins held across the call never leak.
                cache.unpin(&touched);
                return Ok(());
            }
            cache.pin(&touched);
            cache.set_committing(Some(task));
            OptimisticWrite::new(BatchUpdate::new(updates), snapshot)
        };

        tracing::debug!(%task, buckets = touched.len(), "committing move");
        let outcome =
            optimistic::reconcile(&self.store, write, self.policy.commit_timeout).await;

        let mut cache = cache.write();
        cache.unpin(&touched);
        cache.set_committing(None);
        match outcome {
            Reconciled::Confirmed => {
                let _ = self.event_tx.try_send(EngineEvent::MoveCommitted {
                    task,
                    buckets: touched,
                });
                Ok(())
            }
            Reconciled::RolledBack { undo, error } => {
                cache.committed_mut().apply_slice(&undo);
                tracing::warn!(%task, error = %error, "move rolled back");
                let _ = self.event_tx.try_send(EngineEvent::MoveFailed {
                    task,
                    reason: error.to_string(),
                });
                Err(error)
            }
        }
    }
}
