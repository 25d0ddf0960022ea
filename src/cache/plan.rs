//! Execution planning against a previous result set.
//!
//! A plugin is re-executed only when it is new or its content hash changed.
//! Entries synthesized by hooks belong to the plugin they were derived from
//! (`datahook.parent`) and follow it: they are kept while the parent is
//! reused and pruned when the parent disappears or runs again. Summary
//! entries are rebuilt by their hook on every run and are left alone.

use std::collections::{BTreeMap, BTreeSet};

use crate::plugin::Plugin;
use crate::results::ResultSet;

/// What a run has to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Plugins that must execute, in discovery order.
    pub to_run: Vec<Plugin>,

    /// Ids of previous entries to drop.
    pub to_prune: Vec<String>,

    /// Ids of discovered plugins satisfied by the previous result.
    pub reused: Vec<String>,
}

impl ExecutionPlan {
    /// Plan that runs every plugin and prunes nothing.
    pub fn everything(discovered: &[Plugin]) -> Self {
        Self {
            to_run: discovered.to_vec(),
            ..Default::default()
        }
    }

    /// Check whether nothing needs to run or be pruned.
    pub fn is_noop(&self) -> bool {
        self.to_run.is_empty() && self.to_prune.is_empty()
    }
}

/// Compute the execution plan.
pub fn plan(discovered: &[Plugin], previous: Option<&ResultSet>, force: bool) -> ExecutionPlan {
    let previous = match previous {
        Some(previous) if !force => previous,
        _ => return ExecutionPlan::everything(discovered),
    };

    // owner id -> stored content hash; an owner's own entry wins over children
    let mut stored: BTreeMap<&str, &str> = BTreeMap::new();
    for entry in previous.iter().filter(|e| !e.is_summary()) {
        let hash = entry.plugin.content_hash.as_str();
        if entry.is_synthetic() {
            stored.entry(entry.owner_id()).or_insert(hash);
        } else {
            stored.insert(entry.owner_id(), hash);
        }
    }

    let mut result = ExecutionPlan::default();
    for plugin in discovered {
        match stored.get(plugin.id.as_str()) {
            None => {
                tracing::debug!("New plugin {}", plugin.path.display());
                result.to_run.push(plugin.clone());
            }
            Some(hash) if *hash != plugin.content_hash => {
                tracing::debug!("Changed plugin {}", plugin.path.display());
                result.to_run.push(plugin.clone());
            }
            Some(_) => result.reused.push(plugin.id.clone()),
        }
    }

    let discovered_ids: BTreeSet<&str> = discovered.iter().map(|p| p.id.as_str()).collect();
    let rerun: BTreeSet<&str> = result.to_run.iter().map(|p| p.id.as_str()).collect();

    result.to_prune = previous
        .iter()
        .filter(|entry| !entry.is_summary())
        .filter(|entry| {
            let owner = entry.owner_id();
            !discovered_ids.contains(owner) || (entry.is_synthetic() && rerun.contains(owner))
        })
        .map(|entry| entry.id().to_string())
        .collect();

    result
}
