//! Configuration schema.
//!
//! ```yaml
//! plugin_roots:
//!   - /usr/share/fleetcheck/plugins
//! jobs: 8
//! timeout_secs: 300
//! priority: 400
//! include: [openstack]
//! exclude: [deprecated]
//! fact_category: metadata
//! results_file: fleetcheck.json
//! lang: en_US
//! consistent_facts: [release]
//! aggregate_markers: [faraday/positive, faraday/negative]
//! alternatives:
//!   - when_okay: system/clock-ntpd.sh
//!     skip: system/clock-chronyd.sh
//! profile_roots:
//!   - /usr/share/fleetcheck/profiles
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::hooks::{AlternativeRule, DEFAULT_AGGREGATE_MARKERS};
use crate::plugin::PluginFilter;

/// Engine configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directories searched for plugins.
    pub plugin_roots: Vec<PathBuf>,

    /// Worker count; CPU count when unset.
    pub jobs: Option<usize>,

    /// Per-unit time limit in seconds; no limit when unset.
    pub timeout_secs: Option<u64>,

    /// Minimum plugin priority.
    pub priority: u32,

    /// Path substrings a plugin must contain (any of).
    pub include: Vec<String>,

    /// Path substrings that exclude a plugin.
    pub exclude: Vec<String>,

    /// Category holding fact plugins.
    pub fact_category: String,

    /// Results document name inside a snapshot.
    pub results_file: String,

    /// Locale exported to units.
    pub lang: String,

    /// Fact dimensions expected to match within a group.
    pub consistent_facts: Vec<String>,

    /// Path markers of aggregate `key:value;...` checks.
    pub aggregate_markers: Vec<String>,

    /// Mutually exclusive units.
    pub alternatives: Vec<AlternativeRule>,

    /// Directories searched for `.txt` profile definitions.
    pub profile_roots: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plugin_roots: vec![PathBuf::from("plugins")],
            jobs: None,
            timeout_secs: None,
            priority: 0,
            include: Vec::new(),
            exclude: Vec::new(),
            fact_category: "metadata".to_string(),
            results_file: "fleetcheck.json".to_string(),
            lang: "en_US".to_string(),
            consistent_facts: vec!["release".to_string()],
            aggregate_markers: DEFAULT_AGGREGATE_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            alternatives: Vec::new(),
            profile_roots: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Discovery filter from the priority and path settings.
    pub fn filter(&self) -> PluginFilter {
        PluginFilter {
            priority: self.priority,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }

    /// Per-unit timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Apply command-line overrides. Empty lists keep file values.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if !overrides.plugin_roots.is_empty() {
            self.plugin_roots = overrides.plugin_roots.clone();
        }
        if let Some(priority) = overrides.priority {
            self.priority = priority;
        }
        if !overrides.include.is_empty() {
            self.include = overrides.include.clone();
        }
        if !overrides.exclude.is_empty() {
            self.exclude = overrides.exclude.clone();
        }
        if overrides.jobs.is_some() {
            self.jobs = overrides.jobs;
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub plugin_roots: Vec<PathBuf>,
    pub priority: Option<u32>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
}
