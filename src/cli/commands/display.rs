//! Shared rendering of results and correlation reports.

use crate::correlate::{CorrelationReport, GroupReport};
use crate::exec::Status;
use crate::results::{ResultEntry, ResultSet};
use crate::ui::UserInterface;

/// Entries to show, problems first then by path.
pub fn visible_entries(results: &ResultSet, only_failed: bool) -> Vec<&ResultEntry> {
    let mut entries: Vec<&ResultEntry> = results
        .iter()
        .filter(|e| !only_failed || e.status().is_problem())
        .collect();
    entries.sort_by(|a, b| {
        b.status()
            .is_problem()
            .cmp(&a.status().is_problem())
            .then_with(|| a.plugin.path.cmp(&b.plugin.path))
    });
    entries
}

/// Show one line per result, with output for problems.
///
/// In verbose mode every result's output is shown. `blame` adds the
/// bugzilla and kb references of problem results.
pub fn show_results(ui: &mut dyn UserInterface, results: &ResultSet, only_failed: bool, blame: bool) {
    let mode = ui.output_mode();
    if !mode.shows_results() {
        return;
    }

    for entry in visible_entries(results, only_failed) {
        let status = entry.status();
        let line = format!(
            "  {} {}",
            ui.theme().format_status(status),
            entry.plugin.path.display()
        );
        ui.message(&line);

        let value = entry.result.value();
        if !value.is_empty() && (status.is_problem() || mode.shows_unit_output()) {
            for output_line in value.lines() {
                let line = format!("      {}", ui.theme().dim.apply_to(output_line));
                ui.message(&line);
            }
        }

        if blame && status.is_problem() {
            let meta = &entry.plugin.metadata;
            for (label, reference) in [("bugzilla", &meta.bugzilla), ("kb", &meta.kb)] {
                if !reference.is_empty() {
                    ui.message(&format!("      {}: {}", label, reference));
                }
            }
        }
    }
}

/// Per-status counts, e.g. `okay: 3, failed: 1`. Zero counts are left out.
pub fn status_counts(results: &ResultSet) -> String {
    let counts: Vec<String> = Status::ALL
        .iter()
        .map(|s| (s, results.count(*s)))
        .filter(|(_, n)| *n > 0)
        .map(|(s, n)| format!("{}: {}", s, n))
        .collect();

    if counts.is_empty() {
        "no results".to_string()
    } else {
        counts.join(", ")
    }
}

/// Show a correlation report, fleet first then each group.
pub fn show_report(ui: &mut dyn UserInterface, report: &CorrelationReport, only_failed: bool) {
    show_group(ui, "fleet", &report.fleet, only_failed);
    for (name, group) in &report.groups {
        show_group(ui, name, group, only_failed);
    }
}

fn show_group(ui: &mut dyn UserInterface, name: &str, group: &GroupReport, only_failed: bool) {
    if only_failed && group.problems().next().is_none() {
        return;
    }

    ui.show_header(&format!("{} ({})", name, group.hosts.join(", ")));
    if let Some(source) = &group.reused_from {
        ui.message(&format!("  same hosts as {}", source));
    }
    if !ui.output_mode().shows_results() {
        return;
    }

    for verdict in &group.verdicts {
        if only_failed && !verdict.status.is_problem() {
            continue;
        }
        let line = format!(
            "  {} {}",
            ui.theme().format_status(verdict.status),
            verdict.comparator
        );
        ui.message(&line);
        for message_line in verdict.message.lines() {
            ui.message(&format!("      {}", message_line));
        }
    }
}
