//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, validate};
use crate::engine::Engine;
use crate::error::{FleetcheckError, Result};
use crate::ui::UserInterface;

/// Exit code for a run that completed, whatever its findings.
pub const EXIT_OK: i32 = 0;

/// Exit code for a fatal error.
pub const EXIT_FATAL: i32 = 1;

/// Exit code for an invalid invocation or configuration.
pub const EXIT_INVALID: i32 = 2;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Invalid invocations are reported through `ui` and returned as a
    /// [`CommandResult`] with [`EXIT_INVALID`]; fatal errors are returned
    /// as `Err`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: EXIT_OK,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Report an invalid invocation.
    pub fn invalid(ui: &mut dyn UserInterface, message: &str) -> Self {
        ui.error(message);
        Self::failure(EXIT_INVALID)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    working_dir: PathBuf,
}

impl CommandDispatcher {
    /// Create a dispatcher looking for `.fleetcheck.yml` in `working_dir`.
    pub fn new(working_dir: PathBuf) -> Self {
        Self { working_dir }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Load configuration, apply command-line overrides and build the engine.
    pub fn engine(&self, cli: &Cli) -> Result<Engine> {
        let mut config = load_config(cli.config.as_deref(), &self.working_dir)?;
        config.apply_overrides(&cli.overrides());
        validate(&config)?;
        Ok(Engine::new(config))
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let engine = match self.engine(cli) {
            Ok(engine) => engine,
            Err(
                e @ (FleetcheckError::ConfigNotFound { .. }
                | FleetcheckError::ConfigParseError { .. }
                | FleetcheckError::ConfigValidationError { .. }),
            ) => return Ok(CommandResult::invalid(ui, &e.to_string())),
            Err(e) => return Err(e),
        };

        let result = match &cli.command {
            Commands::List(args) => super::list::ListCommand::new(&engine, args.clone()).execute(ui),
            Commands::Run(args) => super::run::RunCommand::new(&engine, args.clone()).execute(ui),
            Commands::Correlate(args) => {
                super::correlate::CorrelateCommand::new(&engine, args.clone()).execute(ui)
            }
        };

        match result {
            Err(FleetcheckError::InvalidArgument { message }) => {
                Ok(CommandResult::invalid(ui, &message))
            }
            other => other,
        }
    }
}
