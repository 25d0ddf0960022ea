//! Persisted JSON shape of a result set.
//!
//! ```json
//! {
//!   "metadata": {"when": "...", "live": false, "source": "fleetcheck", "time": 1.2, "path": "/snap"},
//!   "results": {
//!     "<id>": {"plugin": "/p/core/a.sh", "backend": "core", "id": "<id>", "hash": "...",
//!              "result": {"rc": "okay", "out": "", "err": ""}, "time": 0.01, ...}
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Datahook, ExecutionResult, ResultEntry, ResultSet};
use crate::plugin::{Plugin, PluginMetadata};

/// Source tag written by single-host runs.
pub const RUN_SOURCE: &str = "fleetcheck";

/// Source tag written by correlation runs.
pub const CORRELATE_SOURCE: &str = "fleetcheck-correlate";

/// Run-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub when: DateTime<Utc>,
    pub live: bool,
    pub source: String,
    /// Wall-clock seconds of the whole run.
    pub time: f64,
    /// Snapshot root, empty for live runs.
    pub path: String,
}

impl RunMetadata {
    pub fn new(live: bool, source: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            when: Utc::now(),
            live,
            source: source.into(),
            time: 0.0,
            path: path.into(),
        }
    }
}

/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub plugin: String,
    pub backend: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub id: String,
    pub hash: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub bugzilla: String,
    #[serde(default)]
    pub kb: String,
    pub result: ExecutionResult,
    #[serde(default)]
    pub time: f64,
    #[serde(default, skip_serializing_if = "Datahook::is_empty")]
    pub datahook: Datahook,
}

impl From<&ResultEntry> for EntryRecord {
    fn from(entry: &ResultEntry) -> Self {
        let plugin = &entry.plugin;
        Self {
            plugin: plugin.path_str(),
            backend: plugin.backend.clone(),
            category: plugin.category.clone(),
            subcategory: plugin.subcategory.clone(),
            id: plugin.id.clone(),
            hash: plugin.content_hash.clone(),
            name: plugin.name.clone(),
            description: plugin.metadata.description.clone(),
            long_name: plugin.metadata.long_name.clone(),
            priority: plugin.metadata.priority,
            bugzilla: plugin.metadata.bugzilla.clone(),
            kb: plugin.metadata.kb.clone(),
            result: entry.result.clone(),
            time: entry.result.elapsed,
            datahook: entry.datahook.clone(),
        }
    }
}

impl From<EntryRecord> for ResultEntry {
    fn from(record: EntryRecord) -> Self {
        let plugin = Plugin {
            id: record.id,
            path: PathBuf::from(record.plugin),
            backend: record.backend,
            category: record.category,
            subcategory: record.subcategory,
            name: record.name,
            content_hash: record.hash,
            metadata: PluginMetadata {
                description: record.description,
                long_name: record.long_name,
                priority: record.priority,
                bugzilla: record.bugzilla,
                kb: record.kb,
            },
        };
        let mut result = record.result;
        result.elapsed = record.time;
        ResultEntry {
            plugin,
            result,
            datahook: record.datahook,
        }
    }
}

/// A result set as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub metadata: RunMetadata,
    pub results: BTreeMap<String, EntryRecord>,
}

impl ResultDocument {
    pub fn new(metadata: RunMetadata, set: &ResultSet) -> Self {
        let results = set
            .iter()
            .map(|entry| (entry.id().to_string(), EntryRecord::from(entry)))
            .collect();
        Self { metadata, results }
    }

    /// Rebuild the in-memory set. Keys win over embedded ids.
    pub fn into_set(self) -> ResultSet {
        self.results
            .into_iter()
            .map(|(key, mut record)| {
                record.id = key;
                ResultEntry::from(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::Status;

    fn sample_set() -> ResultSet {
        let plugin = Plugin {
            id: "abc".into(),
            path: PathBuf::from("/p/core/system/clock.sh"),
            backend: "core".into(),
            category: "system".into(),
            subcategory: String::new(),
            name: "clock".into(),
            content_hash: "deadbeef".into(),
            metadata: PluginMetadata {
                description: "Checks clock sync".into(),
                priority: 400,
                ..Default::default()
            },
        };
        let mut result = ExecutionResult::new(Status::Failed, "", "not synced");
        result.elapsed = 0.25;
        std::iter::once(ResultEntry::new(plugin, result)).collect()
    }

    #[test]
    fn document_has_expected_keys() {
        let doc = ResultDocument::new(RunMetadata::new(false, RUN_SOURCE, "/snap"), &sample_set());
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["metadata"]["source"], "fleetcheck");
        assert_eq!(json["metadata"]["live"], false);
        let entry = &json["results"]["abc"];
        assert_eq!(entry["plugin"], "/p/core/system/clock.sh");
        assert_eq!(entry["hash"], "deadbeef");
        assert_eq!(entry["priority"], 400);
        assert_eq!(entry["result"]["rc"], "failed");
        assert_eq!(entry["result"]["err"], "not synced");
        assert_eq!(entry["time"], 0.25);
        assert!(entry.get("datahook").is_none());
    }

    #[test]
    fn reload_preserves_entries() {
        let set = sample_set();
        let doc = ResultDocument::new(RunMetadata::new(false, RUN_SOURCE, "/snap"), &set);
        let text = serde_json::to_string(&doc).unwrap();
        let parsed: ResultDocument = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.into_set(), set);
    }
}
