//! Run command implementation.
//!
//! The `fleetcheck run` command checks one snapshot, or the live host, and
//! prints the results.

use crate::cache::ResultStore;
use crate::cli::args::RunArgs;
use crate::engine::Engine;
use crate::error::Result;
use crate::exec::Target;
use crate::results::{RunMetadata, RUN_SOURCE};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::{show_results, status_counts};

/// The run command implementation.
pub struct RunCommand<'a> {
    engine: &'a Engine,
    args: RunArgs,
}

impl<'a> RunCommand<'a> {
    pub fn new(engine: &'a Engine, args: RunArgs) -> Self {
        Self { engine, args }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Target selected by the arguments, if any.
    pub fn target(&self) -> Option<Target> {
        match (&self.args.snapshot, self.args.live) {
            (Some(path), _) => Some(Target::Snapshot(path.clone())),
            (None, true) => Some(Target::Live),
            (None, false) => None,
        }
    }
}

impl Command for RunCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(target) = self.target() else {
            return Ok(CommandResult::invalid(
                ui,
                "Specify a snapshot directory or --live",
            ));
        };

        let outcome = self.engine.run(&target, self.args.force)?;

        show_results(ui, &outcome.results, self.args.only_failed, self.args.blame);

        ui.message(&format!(
            "{} executed, {} reused, {} pruned in {:.2}s",
            outcome.executed.len(),
            outcome.reused,
            outcome.pruned.len(),
            outcome.elapsed
        ));
        ui.message(&status_counts(&outcome.results));

        if let Some(path) = &outcome.persisted {
            ui.message(&format!("Results saved to {}", path.display()));
        }

        if let Some(output) = &self.args.output {
            let root = target
                .root()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut metadata = RunMetadata::new(target.is_live(), RUN_SOURCE, root);
            metadata.time = outcome.elapsed;
            ResultStore::at(output).save(&outcome.results, metadata)?;
            ui.success(&format!("Wrote {}", output.display()));
        }

        Ok(CommandResult::success())
    }
}
