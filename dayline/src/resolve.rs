//! Coordinate resolver: pointer offsets to drop candidates.
//!
//! Converts a continuous `(x, y)` gesture offset, or a discrete list
//! index on platforms without free-form drag, into an in-range
//! `(bucket index, order)` candidate. The resolver is pure, performs no
//! I/O, and by contract never produces an out-of-range result — both
//! axes are clamped, so callers never see a resolution error.

use thiserror::Error;

/// Errors raised when constructing grid metrics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    /// A cell dimension was zero, negative, or not finite.
    #[error("cell dimensions must be positive and finite")]
    NonPositiveDimension,
    /// The visible window must hold at least one bucket.
    #[error("visible window must hold at least one bucket")]
    NoVisibleBuckets,
}

/// Layout metrics of the timeline grid, in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    bucket_width: f32,
    row_height: f32,
    visible_buckets: usize,
}

impl GridMetrics {
    /// Creates validated grid metrics.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if a dimension is not positive and
    /// finite, or the visible window is empty.
    pub fn new(
        bucket_width: f32,
        row_height: f32,
        visible_buckets: usize,
    ) -> Result<Self, MetricsError> {
        if !(bucket_width.is_finite() && bucket_width > 0.0)
            || !(row_height.is_finite() && row_height > 0.0)
        {
            return Err(MetricsError::NonPositiveDimension);
        }
        if visible_buckets == 0 {
            return Err(MetricsError::NoVisibleBuckets);
        }
        Ok(Self {
            bucket_width,
            row_height,
            visible_buckets,
        })
    }

    /// Width of one day column.
    #[must_use]
    pub const fn bucket_width(&self) -> f32 {
        self.bucket_width
    }

    /// Height of one task row.
    #[must_use]
    pub const fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Number of buckets in the visible window.
    #[must_use]
    pub const fn visible_buckets(&self) -> usize {
        self.visible_buckets
    }
}

/// A continuous pointer offset in layout units, relative to the origin
/// of the visible grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerOffset {
    /// Horizontal offset (columns axis).
    pub x: f32,
    /// Vertical offset (rows axis).
    pub y: f32,
}

impl PointerOffset {
    /// Creates a pointer offset.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A resolved drop candidate: an index into the visible bucket window
/// and an order within that bucket.
///
/// `order` may equal the bucket's current length, meaning "insert at
/// the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    /// Index into the visible window, `0..visible_buckets`.
    pub bucket_index: usize,
    /// Candidate order, `0..=bucket_len`.
    pub order: u32,
}

/// Resolves the bucket column under a horizontal offset.
///
/// `floor((x + bucket_width / 2) / bucket_width)`, clamped to the
/// visible window. The half-cell bias snaps to the nearer column
/// boundary so a pointer resting exactly on an edge does not thrash.
#[must_use]
pub fn bucket_index_at(x: f32, metrics: &GridMetrics) -> usize {
    let raw = ((x + metrics.bucket_width / 2.0) / metrics.bucket_width).floor();
    clamp_to_usize(raw, metrics.visible_buckets - 1)
}

/// Resolves the row order under a vertical offset, for a bucket with
/// `bucket_len` tasks.
///
/// `floor((y + row_height / 2) / row_height)`, clamped to
/// `[0, bucket_len]`; the inclusive upper bound permits insert-at-end.
#[must_use]
pub fn order_at(y: f32, metrics: &GridMetrics, bucket_len: usize) -> u32 {
    let raw = ((y + metrics.row_height / 2.0) / metrics.row_height).floor();
    let slot = clamp_to_usize(raw, bucket_len);
    u32::try_from(slot).unwrap_or(u32::MAX)
}

/// Resolves a full drop candidate from a pointer offset.
///
/// `bucket_len` must be the task count of the bucket the x axis
/// resolves to; when buckets differ in length, resolve the column with
/// [`bucket_index_at`] first and then the order with [`order_at`].
#[must_use]
pub fn resolve_pointer(
    offset: PointerOffset,
    metrics: &GridMetrics,
    bucket_len: usize,
) -> DropTarget {
    DropTarget {
        bucket_index: bucket_index_at(offset.x, metrics),
        order: order_at(offset.y, metrics, bucket_len),
    }
}

/// Resolves a discrete drop index from a reorderable list, clamped to
/// `[0, bucket_len]`.
#[must_use]
pub fn resolve_list_index(index: usize, bucket_len: usize) -> u32 {
    u32::try_from(index.min(bucket_len)).unwrap_or(u32::MAX)
}

/// Clamps a floored float to `[0, max]` as a usize.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_usize(raw: f32, max: usize) -> usize {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    // Safe: raw is non-negative, finite, and already floored.
    let value = raw as u64;
    usize::try_from(value).unwrap_or(max).min(max)
}
