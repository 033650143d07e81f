//! `Dayline` — timeline reordering and optimistic synchronization engine.
//!
//! The engine behind a day-by-day task planner: it tracks where every
//! task sits on the timeline (its bucket and dense rank), turns pointer
//! offsets into drop candidates, recomputes the ordering continuously
//! during a drag, and keeps the locally cached view consistent with an
//! asynchronous remote store through an optimistic commit/rollback
//! pipeline.

pub mod cache;
pub mod config;
pub mod drag;
pub mod positions;
pub mod project;
pub mod reorder;
pub mod resolve;
pub mod sync;
