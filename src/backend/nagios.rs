//! Nagios-compatible plugins.
//!
//! Nagios plugins use fixed exit codes and write their report to stdout.
//! The report is moved to the `err` field, where every other backend keeps
//! its human-readable output.

use std::path::Path;

use super::{has_component, Adapter};
use crate::error::Result;
use crate::exec::{is_executable, run_process, Invocation, RawResult, RunContext, Status, StatusCodes};
use crate::plugin::Plugin;

pub struct NagiosAdapter;

impl Adapter for NagiosAdapter {
    fn name(&self) -> &'static str {
        "nagios"
    }

    fn matches(&self, path: &Path) -> bool {
        has_component(path, "nagios") && is_executable(path)
    }

    fn run(&self, plugin: &Plugin, ctx: &RunContext) -> Result<RawResult> {
        let invocation = Invocation::for_plugin(plugin, ctx);
        let raw = run_process::<&str>(&plugin.path, &[], &invocation)?;
        Ok(RawResult {
            exit: raw.exit,
            stdout: String::new(),
            stderr: raw.stdout,
        })
    }

    fn classify(&self, code: i32, _codes: &StatusCodes) -> Status {
        match code {
            0 => Status::Okay,
            1 => Status::Info,
            2 => Status::Failed,
            3 => Status::Skipped,
            _ => Status::Error,
        }
    }
}
