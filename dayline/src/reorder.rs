//! Pure reorder planning.
//!
//! Given a task and a candidate placement, [`plan_move`] produces the
//! replacement state of exactly the buckets the move touches — one
//! bucket for a same-day reorder, two for a cross-day move — or nothing
//! for a no-op. Planning never performs I/O and never mutates the input
//! model, so every rule here is independently unit-testable.
//!
//! Guarantees:
//! - density: the returned slice's orders are structurally `0..n-1`;
//! - conservation: a move never creates or drops a task;
//! - idempotence: a candidate equal to the current placement is `None`;
//! - O(n) in bucket size (single remove + insert per bucket).

use dayline_proto::task::{Placement, TaskId};

use crate::positions::{BucketSlice, PositionError, PositionModel};

/// Plans a move of `task` to the candidate `target` placement.
///
/// The target order is clamped to the insertable range of the target
/// bucket, so resolver candidates past the end of a bucket land at the
/// end. Returns `Ok(None)` when the clamped candidate equals the task's
/// current placement — including the hover tie-break: a candidate that
/// resolves to the task's own slot leaves the model untouched rather
/// than swapping, so nothing jitters while the pointer rests there.
///
/// # Errors
///
/// Returns [`PositionError::UnknownTask`] if the model does not track
/// the task.
pub fn plan_move(
    model: &PositionModel,
    task: TaskId,
    target: Placement,
) -> Result<Option<BucketSlice>, PositionError> {
    let current = model
        .placement(task)
        .ok_or(PositionError::UnknownTask(task))?;

    if target.bucket == current.bucket {
        let members = model.bucket_tasks(current.bucket);
        // After lifting the task out, valid insertion slots are
        // 0..len-1, so "insert at end" clamps to the last slot.
        let last = members.len().saturating_sub(1);
        let to = usize::try_from(target.order).unwrap_or(usize::MAX).min(last);
        let from = usize::try_from(current.order).unwrap_or(usize::MAX).min(last);
        if to == from {
            return Ok(None);
        }
        let mut reordered = members.to_vec();
        let moved = reordered.remove(from);
        reordered.insert(to, moved);
        return Ok(Some(BucketSlice::new(vec![(current.bucket, reordered)])));
    }

    // Cross-bucket: close the gap in the origin, open one in the
    // destination at the clamped slot.
    let mut origin = model.bucket_tasks(current.bucket).to_vec();
    origin.retain(|id| *id != task);

    let mut destination = model.bucket_tasks(target.bucket).to_vec();
    let to = usize::try_from(target.order)
        .unwrap_or(usize::MAX)
        .min(destination.len());
    destination.insert(to, task);

    Ok(Some(BucketSlice::new(vec![
        (current.bucket, origin),
        (target.bucket, destination),
    ])))
}
