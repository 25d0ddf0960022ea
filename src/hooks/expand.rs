//! Aggregate result expansion.
//!
//! Some checks report many independent items at once, e.g. one MTU per
//! interface as `eth0:1500;eth1:9000`. Comparing that blob across hosts
//! hides which item differs, so each `key:value` pair becomes its own
//! synthetic entry:
//!
//! - id: `"{parent_id}-{calc_id(key)}"` (see [`synthetic_id`])
//! - path: `"{parent_path}-{key}"`
//! - result: the parent's status with the pair as `err`
//! - `datahook.parent`: the parent id
//!
//! The parent entry is removed. A repeated key keeps its first pair. Entries that are already synthetic are
//! never expanded again.

use std::collections::BTreeSet;
use std::path::PathBuf;

use super::Hook;
use crate::error::Result;
use crate::plugin::synthetic_id;
use crate::results::{Datahook, ExecutionResult, ResultEntry, ResultSet};

/// Default path markers of aggregate checks.
pub const DEFAULT_AGGREGATE_MARKERS: [&str; 2] = ["faraday/positive", "faraday/negative"];

pub struct ExpandAggregate {
    markers: Vec<String>,
}

impl ExpandAggregate {
    pub const NAME: &'static str = "expand-aggregate";

    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    fn is_aggregate(&self, entry: &ResultEntry) -> bool {
        !entry.is_synthetic() && self.markers.iter().any(|m| entry.plugin.path_contains(m))
    }
}

impl Default for ExpandAggregate {
    fn default() -> Self {
        Self::new(DEFAULT_AGGREGATE_MARKERS.iter().map(|m| m.to_string()).collect())
    }
}

impl Hook for ExpandAggregate {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> u32 {
        9
    }

    fn apply(&self, set: &ResultSet) -> Result<ResultSet> {
        let mut out = set.clone();

        for entry in set.iter().filter(|e| self.is_aggregate(e)) {
            let Some(pairs) = split_pairs(&entry.result.stderr) else {
                continue;
            };

            out.remove(entry.id());
            let mut seen = BTreeSet::new();
            for (key, pair) in pairs {
                if !seen.insert(key) {
                    tracing::warn!(
                        "{} repeats item '{}'; keeping the first",
                        entry.plugin.path.display(),
                        key
                    );
                    continue;
                }
                out.insert(expand_one(entry, key, pair));
            }
            tracing::debug!("Expanded {} into individual entries", entry.plugin.path.display());
        }

        Ok(out)
    }
}

/// `key:value;key:value` into `(key, pair)`; `None` unless every item is a pair.
fn split_pairs(text: &str) -> Option<Vec<(&str, &str)>> {
    let pairs: Vec<(&str, &str)> = text
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.split_once(':').map(|(key, _)| (key.trim(), item)))
        .collect::<Option<_>>()?;

    if pairs.is_empty() {
        None
    } else {
        Some(pairs)
    }
}

fn expand_one(parent: &ResultEntry, key: &str, pair: &str) -> ResultEntry {
    let mut plugin = parent.plugin.clone();
    plugin.id = synthetic_id(&parent.plugin.id, key);
    plugin.path = PathBuf::from(format!("{}-{}", parent.plugin.path_str(), key));
    plugin.metadata.description = suffixed(&parent.plugin.metadata.description, key);
    plugin.metadata.long_name = suffixed(&parent.plugin.metadata.long_name, key);

    let mut result = ExecutionResult::new(parent.result.status, String::new(), pair);
    result.elapsed = parent.result.elapsed;

    ResultEntry {
        plugin,
        result,
        datahook: Datahook {
            prior: Vec::new(),
            parent: Some(parent.plugin.id.clone()),
        },
    }
}

fn suffixed(text: &str, key: &str) -> String {
    if text.is_empty() {
        key.to_string()
    } else {
        format!("{}: {}", text, key)
    }
}
