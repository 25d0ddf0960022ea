//! List command implementation.
//!
//! The `fleetcheck list` command shows the plugins a run would execute.

use crate::cli::args::ListArgs;
use crate::engine::Engine;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand<'a> {
    engine: &'a Engine,
    args: ListArgs,
}

impl<'a> ListCommand<'a> {
    pub fn new(engine: &'a Engine, args: ListArgs) -> Self {
        Self { engine, args }
    }

    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let plugins = self.engine.discover()?;

        for plugin in &plugins {
            let line = format!(
                "  {} {} {}",
                ui.theme().dim.apply_to(&plugin.id),
                ui.theme().key.apply_to(format!("{:<7}", plugin.backend)),
                plugin.path.display()
            );
            ui.message(&line);

            if self.args.description && !plugin.metadata.description.is_empty() {
                let line = format!(
                    "      {}",
                    ui.theme().dim.apply_to(&plugin.metadata.description)
                );
                ui.message(&line);
            }
        }

        ui.message(&format!("{} plugins", plugins.len()));
        Ok(CommandResult::success())
    }
}
