//! Incremental execution cache.
//!
//! [`plan`] decides which plugins must run against the result set left by
//! the previous run, and [`ResultStore`] loads and atomically saves that
//! result set next to the snapshot.

pub mod plan;
pub mod store;

pub use plan::{plan, ExecutionPlan};
pub use store::ResultStore;
