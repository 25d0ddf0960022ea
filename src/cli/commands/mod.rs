//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`], which loads the configuration once and
//! hands every command the same [`Engine`](crate::engine::Engine).

pub mod correlate;
pub mod dispatcher;
pub mod display;
pub mod list;
pub mod run;

pub use dispatcher::{
    Command, CommandDispatcher, CommandResult, EXIT_FATAL, EXIT_INVALID, EXIT_OK,
};
