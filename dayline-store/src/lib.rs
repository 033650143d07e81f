//! In-memory reference implementation of the `Dayline` remote store.
//!
//! Holds the authoritative copy of every task record and applies
//! placement batches atomically, preserving the per-bucket density
//! invariant on its own copy. Serves as the store collaborator in
//! integration tests and as the canonical description of store-side
//! validation semantics.

pub mod store;

pub use store::{StoreError, TaskStore};
