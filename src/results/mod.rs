//! Execution results.
//!
//! A [`ResultSet`] maps plugin ids to [`ResultEntry`] values. It is created
//! by the scheduler, changed only by hooks, and persisted as a
//! [`ResultDocument`].

pub mod document;
pub mod entry;
pub mod set;

pub use document::{EntryRecord, ResultDocument, RunMetadata, CORRELATE_SOURCE, RUN_SOURCE};
pub use entry::{Datahook, ExecutionResult, PriorResult, ResultEntry, SUMMARY_BACKEND};
pub use set::ResultSet;
