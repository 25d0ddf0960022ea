//! Command-line interface for fleetcheck.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CorrelateArgs, ListArgs, RunArgs};
pub use commands::{
    Command, CommandDispatcher, CommandResult, EXIT_FATAL, EXIT_INVALID, EXIT_OK,
};
