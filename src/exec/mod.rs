//! Plugin execution.
//!
//! This module provides:
//!
//! - [`Status`] and [`StatusCodes`] for per-run exit code assignment
//! - [`RunContext`] and [`Target`], the immutable context of a run
//! - [`run_process`] for invoking one unit with an optional timeout
//! - [`Scheduler`] for running many units on a bounded worker pool

pub mod context;
pub mod process;
pub mod scheduler;
pub mod status;

pub use context::{RunContext, Target};
pub use process::{is_executable, run_process, which, Invocation, RawExit, RawResult};
pub use scheduler::Scheduler;
pub use status::{Status, StatusCodes};
