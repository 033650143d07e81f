//! The optimistic write shape: snapshot, apply, commit, reconcile.
//!
//! Local state is mutated before the store confirms anything; what
//! varies per mutation is only the batch sent upstream and the undo
//! value that puts local state back. This module owns the commit and
//! reconcile steps so call sites cannot improvise their own
//! rollback handling.

use std::time::Duration;

use dayline_proto::batch::BatchUpdate;

use super::{CommitError, RemoteStore};

/// An optimistic write whose local effect has already been applied.
///
/// `undo` is whatever the caller needs to restore the pre-write state —
/// for a reorder, the pre-move bucket slice.
#[derive(Debug, Clone)]
pub struct OptimisticWrite<U> {
    /// The batch to persist.
    pub batch: BatchUpdate,
    /// Inverse of the local mutation.
    pub undo: U,
}

impl<U> OptimisticWrite<U> {
    /// Pairs a batch with its undo value.
    pub const fn new(batch: BatchUpdate, undo: U) -> Self {
        Self { batch, undo }
    }
}

/// The outcome of reconciling an optimistic write with the store.
#[derive(Debug)]
pub enum Reconciled<U> {
    /// The store confirmed the write; local state already matches.
    Confirmed,
    /// The store refused or timed out; the caller must apply `undo`.
    RolledBack {
        /// Inverse of the local mutation, to be applied now.
        undo: U,
        /// Why the commit failed.
        error: CommitError,
    },
}

impl<U> Reconciled<U> {
    /// Whether the write was confirmed.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Sends an optimistic write to the store and reconciles the result.
///
/// A store answer within `timeout` resolves the write either way; no
/// answer is treated as failure, since the local view cannot stay
/// tentatively diverged forever. Failed writes are never retried here —
/// a retry against state that may have moved on requires a fresh user
/// action.
pub async fn reconcile<S: RemoteStore, U>(
    store: &S,
    write: OptimisticWrite<U>,
    timeout: Duration,
) -> Reconciled<U> {
    match tokio::time::timeout(timeout, store.apply_batch(&write.batch)).await {
        Ok(Ok(())) => Reconciled::Confirmed,
        Ok(Err(rejection)) => {
            tracing::warn!(error = %rejection, "store rejected optimistic write");
            Reconciled::RolledBack {
                undo: write.undo,
                error: CommitError::Rejected(rejection),
            }
        }
        Err(_) => {
            tracing::warn!(?timeout, "optimistic write timed out");
            Reconciled::RolledBack {
                undo: write.undo,
                error: CommitError::Timeout(timeout),
            }
        }
    }
}
