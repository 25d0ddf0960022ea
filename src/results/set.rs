//! Result sets keyed by plugin id.

use std::collections::btree_map::{self, BTreeMap};

use super::ResultEntry;
use crate::exec::Status;

/// Mapping from plugin id to its latest entry.
///
/// Backed by a `BTreeMap` so iteration and serialization are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    entries: BTreeMap<String, ResultEntry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ResultEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ResultEntry> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or replace the entry for its id.
    pub fn insert(&mut self, entry: ResultEntry) -> Option<ResultEntry> {
        self.entries.insert(entry.id().to_string(), entry)
    }

    pub fn remove(&mut self, id: &str) -> Option<ResultEntry> {
        self.entries.remove(id)
    }

    /// Keep entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&ResultEntry) -> bool) {
        self.entries.retain(|_, entry| keep(entry));
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ResultEntry> {
        self.entries.values_mut()
    }

    /// First entry whose plugin path ends with `suffix`.
    pub fn find_by_path_suffix(&self, suffix: &str) -> Option<&ResultEntry> {
        self.entries
            .values()
            .find(|e| e.plugin.path.to_string_lossy().ends_with(suffix))
    }

    /// Number of entries per status.
    pub fn count(&self, status: Status) -> usize {
        self.entries.values().filter(|e| e.status() == status).count()
    }
}

impl FromIterator<ResultEntry> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ResultEntry>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<ResultEntry> for ResultSet {
    fn extend<I: IntoIterator<Item = ResultEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultEntry;
    type IntoIter = btree_map::IntoValues<String, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Plugin, PluginMetadata};
    use crate::results::ExecutionResult;
    use std::path::PathBuf;

    fn entry(id: &str, path: &str, status: Status) -> ResultEntry {
        let plugin = Plugin {
            id: id.into(),
            path: PathBuf::from(path),
            backend: "core".into(),
            category: String::new(),
            subcategory: String::new(),
            name: String::new(),
            content_hash: String::new(),
            metadata: PluginMetadata::default(),
        };
        ResultEntry::new(plugin, ExecutionResult::new(status, "", ""))
    }

    #[test]
    fn insert_replaces_by_id() {
        let mut set = ResultSet::new();
        set.insert(entry("a", "/p/a.sh", Status::Okay));
        set.insert(entry("a", "/p/a.sh", Status::Failed));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().status(), Status::Failed);
    }

    #[test]
    fn find_by_suffix_and_count() {
        let set: ResultSet = vec![
            entry("a", "/p/core/system/ntpd.sh", Status::Okay),
            entry("b", "/p/core/system/chronyd.sh", Status::Failed),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            set.find_by_path_suffix("system/chronyd.sh").map(|e| e.id()),
            Some("b")
        );
        assert_eq!(set.count(Status::Okay), 1);
        assert_eq!(set.count(Status::Skipped), 0);
    }
}
