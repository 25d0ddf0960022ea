//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Fleetcheck - run diagnostic checks against live hosts and snapshots.
#[derive(Debug, Parser)]
#[command(name = "fleetcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .fleetcheck.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Plugin root directory (repeatable, replaces configured roots)
    #[arg(long = "plugins", value_name = "DIR", global = true)]
    pub plugins: Vec<PathBuf>,

    /// Minimum plugin priority
    #[arg(long, global = true)]
    pub priority: Option<u32>,

    /// Only run plugins whose path contains one of these (comma-separated)
    #[arg(short, long, value_delimiter = ',', global = true)]
    pub include: Vec<String>,

    /// Skip plugins whose path contains one of these (comma-separated)
    #[arg(short = 'x', long, value_delimiter = ',', global = true)]
    pub exclude: Vec<String>,

    /// Number of plugins run in parallel (defaults to CPU count)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Kill plugins running longer than this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Show every result with its output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show the summary only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config values given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            plugin_roots: self.plugins.clone(),
            priority: self.priority,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            jobs: self.jobs,
            timeout_secs: self.timeout,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List discovered plugins
    List(ListArgs),

    /// Run plugins against a snapshot or the live host
    Run(RunArgs),

    /// Compare results across hosts
    Correlate(CorrelateArgs),
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Show plugin descriptions
    #[arg(short, long)]
    pub description: bool,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Snapshot directory to check
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Check the running host instead of a snapshot
    #[arg(short, long, conflicts_with = "snapshot")]
    pub live: bool,

    /// Ignore stored results and run every plugin
    #[arg(short, long)]
    pub force: bool,

    /// Also write the results document to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show only failed and errored results
    #[arg(long)]
    pub only_failed: bool,

    /// Show the bugzilla and kb references of failed results
    #[arg(long)]
    pub blame: bool,
}

/// Arguments for the `correlate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CorrelateArgs {
    /// Snapshot directories or results documents, one per host
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Run plugins against each snapshot before correlating
    #[arg(short, long)]
    pub run: bool,

    /// Write the correlation report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show only groups and verdicts with problems
    #[arg(long)]
    pub only_failed: bool,
}
