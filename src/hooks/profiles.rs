//! Profile summaries.
//!
//! A profile is a `.txt` file naming the checks relevant to one concern:
//!
//! ```text
//! # description: OpenStack controller health
//! +openstack
//! +system/clock
//! -openstack/swift
//! ```
//!
//! `+` lines include paths containing the fragment, `-` lines exclude them,
//! and `# key: value` lines are read like plugin headers. Each profile adds
//! one summary entry whose status folds the statuses of its members and
//! whose `err` holds the members as JSON. Profiles with `sysinfo` in their
//! name only collect information: skipped members are left out and the
//! summary is `INFO`, or `SKIPPED` when nothing matched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::Hook;
use crate::error::{FleetcheckError, Result};
use crate::exec::Status;
use crate::plugin::{content_hash, parse_header, plugin_id, Plugin, PluginFilter, PluginMetadata};
use crate::results::{ExecutionResult, ResultEntry, ResultSet, SUMMARY_BACKEND};

/// A loaded profile definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub path: PathBuf,
    pub name: String,
    pub content_hash: String,
    pub metadata: PluginMetadata,
    pub filter: PluginFilter,
}

impl Profile {
    /// Parse a profile from its text. `relative` is the path below the
    /// profiles root and decides the id.
    pub fn parse(path: &Path, relative: &Path, text: &str, hash: String) -> Self {
        let mut filter = PluginFilter::new();
        for line in text.lines() {
            if let Some(fragment) = line.strip_prefix('+').map(str::trim) {
                if !fragment.is_empty() {
                    filter = filter.include(fragment);
                }
            } else if let Some(fragment) = line.strip_prefix('-').map(str::trim) {
                if !fragment.is_empty() {
                    filter = filter.exclude(fragment);
                }
            }
        }

        Self {
            id: plugin_id(relative),
            path: path.to_path_buf(),
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            content_hash: hash,
            metadata: parse_header(text),
            filter,
        }
    }

    fn load(path: &Path, root: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let hash = content_hash(path)?;
        let relative = path.strip_prefix(root).unwrap_or(path);
        Ok(Self::parse(path, relative, &text, hash))
    }

    pub fn is_sysinfo(&self) -> bool {
        self.name.contains("sysinfo")
    }

    fn admits(&self, entry: &ResultEntry) -> bool {
        !entry.is_summary()
            && self.filter.admits_path(&entry.plugin.path_str())
            && !(self.is_sysinfo() && entry.status() == Status::Skipped)
    }

    /// Build the summary entry over `set`.
    pub fn summarize(&self, set: &ResultSet) -> Result<ResultEntry> {
        let members: Vec<Member<'_>> = set
            .iter()
            .filter(|e| self.admits(e))
            .map(|e| Member {
                plugin_id: e.id(),
                plugin: e.plugin.path_str(),
                err: e.result.stderr.trim(),
                rc: e.status(),
            })
            .collect();

        let statuses: Vec<Status> = members.iter().map(|m| m.rc).collect();
        let status = overall(&statuses, self.is_sysinfo());
        let err = serde_json::to_string(&members)?;

        let plugin = Plugin {
            id: self.id.clone(),
            path: self.path.clone(),
            backend: SUMMARY_BACKEND.to_string(),
            category: "profiles".to_string(),
            subcategory: String::new(),
            name: self.name.clone(),
            content_hash: self.content_hash.clone(),
            metadata: self.metadata.clone(),
        };
        Ok(ResultEntry::new(plugin, ExecutionResult::new(status, "", err)))
    }
}

#[derive(Serialize)]
struct Member<'a> {
    plugin_id: &'a str,
    plugin: String,
    err: &'a str,
    rc: Status,
}

fn overall(statuses: &[Status], sysinfo: bool) -> Status {
    if sysinfo {
        return if statuses.is_empty() {
            Status::Skipped
        } else {
            Status::Info
        };
    }
    if statuses.iter().any(Status::is_problem) {
        Status::Failed
    } else if statuses.contains(&Status::Info) {
        Status::Info
    } else if statuses.contains(&Status::Skipped) {
        Status::Skipped
    } else {
        Status::Okay
    }
}

/// Load every `.txt` profile below `roots`.
///
/// Profiles are optional: unreadable roots and files are logged and skipped.
pub fn load_profiles(roots: &[PathBuf]) -> Vec<Profile> {
    let mut profiles: Vec<Profile> = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping profiles in {}: {}", root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !path.extension().is_some_and(|ext| ext == "txt") {
                continue;
            }

            match Profile::load(path, root) {
                Ok(profile) if profiles.iter().any(|p| p.id == profile.id) => {
                    tracing::debug!("{} shadowed by an earlier root", path.display());
                }
                Ok(profile) => profiles.push(profile),
                Err(e) => {
                    let err = FleetcheckError::Discovery {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    };
                    tracing::warn!("{}", err);
                }
            }
        }
    }

    tracing::debug!("Loaded {} profiles", profiles.len());
    profiles
}

/// Adds one summary entry per profile.
pub struct Profiles {
    profiles: Vec<Profile>,
}

impl Profiles {
    pub const NAME: &'static str = "profiles";

    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }
}

impl Hook for Profiles {
    fn name(&self) -> &str {
        Self::NAME
    }

    /// After every data hook, so summaries see final statuses.
    fn priority(&self) -> u32 {
        10
    }

    fn apply(&self, set: &ResultSet) -> Result<ResultSet> {
        let mut out = set.clone();
        // Summaries of profiles that no longer exist
        out.retain(|e| !e.is_summary() || self.profiles.iter().any(|p| p.id == e.id()));

        for profile in &self.profiles {
            out.insert(profile.summarize(set)?);
        }
        Ok(out)
    }
}
