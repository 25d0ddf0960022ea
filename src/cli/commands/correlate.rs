//! Correlate command implementation.
//!
//! The `fleetcheck correlate` command compares stored (or freshly run)
//! results of several hosts.

use std::time::Instant;

use crate::cache::ResultStore;
use crate::cli::args::CorrelateArgs;
use crate::correlate::CorrelationDocument;
use crate::engine::Engine;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::show_report;

/// The correlate command implementation.
pub struct CorrelateCommand<'a> {
    engine: &'a Engine,
    args: CorrelateArgs,
}

impl<'a> CorrelateCommand<'a> {
    pub fn new(engine: &'a Engine, args: CorrelateArgs) -> Self {
        Self { engine, args }
    }

    pub fn args(&self) -> &CorrelateArgs {
        &self.args
    }
}

impl Command for CorrelateCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.paths.len() < 2 {
            return Ok(CommandResult::invalid(
                ui,
                "Correlation needs the results of at least two hosts",
            ));
        }

        let started = Instant::now();
        let report = self
            .engine
            .correlate_paths(&self.args.paths, self.args.run)?;
        let elapsed = started.elapsed().as_secs_f64();

        show_report(ui, &report, self.args.only_failed);

        let problems = std::iter::once(&report.fleet)
            .chain(report.groups.values())
            .filter(|g| g.problems().next().is_some())
            .count();
        ui.message(&format!(
            "{} groups, {} with problems, in {:.2}s",
            report.groups.len(),
            problems,
            elapsed
        ));

        if let Some(output) = &self.args.output {
            ResultStore::at(output).write_json(&CorrelationDocument::new(report, elapsed))?;
            ui.success(&format!("Wrote {}", output.display()));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::dispatcher::EXIT_INVALID;
    use crate::exec::Status;
    use crate::plugin::{plugin_id, Plugin, PluginMetadata};
    use crate::results::{ExecutionResult, ResultEntry, ResultSet, RunMetadata, RUN_SOURCE};
    use crate::ui::MockUI;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn save_host(dir: &Path, status: Status) {
        let path = PathBuf::from("/p/core/system/ntp.sh");
        let plugin = Plugin {
            id: plugin_id(&path),
            path,
            backend: "core".into(),
            category: "system".into(),
            subcategory: String::new(),
            name: "ntp".into(),
            content_hash: "h".into(),
            metadata: PluginMetadata::default(),
        };
        let set: ResultSet = std::iter::once(ResultEntry::new(
            plugin,
            ExecutionResult::new(status, "", ""),
        ))
        .collect();
        ResultStore::for_snapshot(dir, "fleetcheck.json")
            .save(&set, RunMetadata::new(false, RUN_SOURCE, ""))
            .unwrap();
    }

    #[test]
    fn single_path_is_invalid() {
        let engine = Engine::default();
        let mut ui = MockUI::new();
        let result = CorrelateCommand::new(
            &engine,
            CorrelateArgs {
                paths: vec![PathBuf::from("a")],
                ..Default::default()
            },
        )
        .execute(&mut ui)
        .unwrap();
        assert_eq!(result.exit_code, EXIT_INVALID);
    }

    #[test]
    fn reports_failed_outputs_and_writes_document() {
        let temp = TempDir::new().unwrap();
        let h1 = temp.path().join("h1");
        let h2 = temp.path().join("h2");
        std::fs::create_dir_all(&h1).unwrap();
        std::fs::create_dir_all(&h2).unwrap();
        save_host(&h1, Status::Okay);
        save_host(&h2, Status::Failed);
        let output = temp.path().join("report.json");

        let engine = Engine::default();
        let mut ui = MockUI::new();
        let result = CorrelateCommand::new(
            &engine,
            CorrelateArgs {
                paths: vec![h1, h2],
                output: Some(output.clone()),
                ..Default::default()
            },
        )
        .execute(&mut ui)
        .unwrap();

        assert!(result.success);
        assert!(ui.has_message("/p/core/system/ntp.sh: h2"));
        assert!(ui.has_message("0 groups, 1 with problems"));

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(doc["metadata"]["source"], "fleetcheck-correlate");
    }
}
