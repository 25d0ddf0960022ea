//! Plain executable units.

use std::path::Path;

use super::Adapter;
use crate::error::Result;
use crate::exec::{is_executable, run_process, Invocation, RawResult, RunContext};
use crate::plugin::Plugin;

/// Runs any executable file and classifies its exit code against the
/// codes assigned for the run.
pub struct CoreAdapter;

impl Adapter for CoreAdapter {
    fn name(&self) -> &'static str {
        "core"
    }

    fn matches(&self, path: &Path) -> bool {
        is_executable(path)
    }

    fn run(&self, plugin: &Plugin, ctx: &RunContext) -> Result<RawResult> {
        let invocation = Invocation::for_plugin(plugin, ctx);
        run_process::<&str>(&plugin.path, &[], &invocation)
    }
}
