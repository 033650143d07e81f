//! Core task and placement types for the `Dayline` timeline.
//!
//! Defines the task identifier, the day-bucket key (a calendar date or
//! the unscheduled backlog), the placement of a task within a bucket,
//! and the raw record shape owned by the remote store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The grouping a task is scheduled into: a calendar day, or the
/// unscheduled backlog.
///
/// Buckets are the scope of reordering: every task carries exactly one
/// bucket key, and `order` values are dense per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BucketKey {
    /// A calendar day.
    Day(NaiveDate),
    /// The unscheduled backlog.
    Unscheduled,
}

impl BucketKey {
    /// Parses a bucket key from its display form: `YYYY-MM-DD` or
    /// `unscheduled`.
    ///
    /// Returns `None` if the string is neither.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s == "unscheduled" {
            return Some(Self::Unscheduled);
        }
        s.parse::<NaiveDate>().ok().map(Self::Day)
    }

    /// Returns the calendar date if this is a day bucket.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Day(d) => Some(*d),
            Self::Unscheduled => None,
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Unscheduled => write!(f, "unscheduled"),
        }
    }
}

impl From<NaiveDate> for BucketKey {
    fn from(d: NaiveDate) -> Self {
        Self::Day(d)
    }
}

/// Where a task sits on the timeline: its bucket and its dense,
/// zero-based rank within that bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// The bucket the task belongs to.
    pub bucket: BucketKey,
    /// Zero-based rank within the bucket.
    pub order: u32,
}

impl Placement {
    /// Creates a placement from a bucket and order.
    #[must_use]
    pub const fn new(bucket: BucketKey, order: u32) -> Self {
        Self { bucket, order }
    }
}

/// A task record as the remote store owns it.
///
/// The engine treats `order` as authoritative only at load time; from
/// then until commit it owns the value. The display fields (`title`,
/// `done`, `created_at`) are carried for rendering and never
/// interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique task identifier.
    pub id: TaskId,
    /// The bucket this task is scheduled into.
    pub bucket: BucketKey,
    /// Zero-based rank within the bucket.
    pub order: u32,
    /// Task title (display only).
    pub title: String,
    /// Completion flag (display only).
    pub done: bool,
    /// When this task was created (milliseconds since epoch).
    pub created_at: u64,
}

impl TaskRecord {
    /// Returns this record's placement.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        Placement::new(self.bucket, self.order)
    }
}

/// An inclusive range of buckets, the unit of fetching and prefetching.
///
/// Covers the days `from..=to` and, when `include_unscheduled` is set,
/// the backlog bucket as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketRange {
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range (inclusive).
    pub to: NaiveDate,
    /// Whether the unscheduled backlog is part of the range.
    pub include_unscheduled: bool,
}

impl BucketRange {
    /// Creates a day range without the backlog. `from` and `to` are
    /// swapped if given in reverse.
    #[must_use]
    pub fn days(from: NaiveDate, to: NaiveDate) -> Self {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        Self {
            from,
            to,
            include_unscheduled: false,
        }
    }

    /// Returns a copy of this range that also covers the backlog.
    #[must_use]
    pub const fn with_unscheduled(mut self) -> Self {
        self.include_unscheduled = true;
        self
    }

    /// Whether the given bucket falls inside this range.
    #[must_use]
    pub fn contains(&self, bucket: &BucketKey) -> bool {
        match bucket {
            BucketKey::Day(d) => *d >= self.from && *d <= self.to,
            BucketKey::Unscheduled => self.include_unscheduled,
        }
    }
}
