//! Fleetcheck - diagnostic checks for live hosts and snapshots.
//!
//! Fleetcheck discovers check plugins below one or more plugin roots, runs
//! them against a snapshot directory (or the running host), post-processes
//! the results through a hook pipeline and can compare the results of many
//! hosts against each other.
//!
//! # Modules
//!
//! - [`plugin`] - Plugin discovery, identity and header metadata
//! - [`backend`] - Backend adapters (core, nagios, ansible)
//! - [`exec`] - Status codes, process invocation and the scheduler
//! - [`results`] - Results and the persisted results document
//! - [`cache`] - Incremental execution planning and result storage
//! - [`hooks`] - Result post-processing pipeline
//! - [`correlate`] - Cross-host grouping and comparison
//! - [`engine`] - Library entry points
//! - [`config`] - Configuration loading and validation
//! - [`cli`] - Command-line interface
//! - [`ui`] - Terminal output
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use fleetcheck::plugin::{calc_id, parse_header};
//!
//! let meta = parse_header("#!/bin/sh\n# priority: 400\n");
//! assert_eq!(meta.priority, 400);
//! assert_eq!(calc_id("/p/core/a.sh"), calc_id("/p/core/a.sh"));
//! ```
//!
//! For complete runs, see [`engine::Engine`] and the integration tests.

pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod engine;
pub mod error;
pub mod exec;
pub mod hooks;
pub mod plugin;
pub mod results;
pub mod ui;

pub use engine::{correlate, discover, execute, Engine, RunOutcome};
pub use error::{FleetcheckError, Result};
