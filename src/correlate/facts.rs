//! Fact extraction.
//!
//! Fact plugins live in a designated category and report one scalar per
//! host (a release string, a role). Each fact plugin is one dimension.

use std::collections::{BTreeMap, BTreeSet};

use super::HostId;
use crate::exec::Status;
use crate::plugin::Plugin;
use crate::results::{ResultEntry, ResultSet};

/// `dimension -> value -> hosts` for every fact reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactTable {
    dimensions: BTreeMap<String, BTreeMap<String, BTreeSet<HostId>>>,
}

impl FactTable {
    /// Record that `host` reported `value` for `dimension`.
    pub fn record(&mut self, dimension: &str, value: &str, host: &str) {
        self.dimensions
            .entry(dimension.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(host.to_string());
    }

    /// Hosts per value of one dimension.
    pub fn values(&self, dimension: &str) -> Option<&BTreeMap<String, BTreeSet<HostId>>> {
        self.dimensions.get(dimension)
    }

    /// Every `(dimension, value, hosts)` triple, sorted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &BTreeSet<HostId>)> {
        self.dimensions.iter().flat_map(|(dim, values)| {
            values
                .iter()
                .map(move |(value, hosts)| (dim.as_str(), value.as_str(), hosts))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

/// Dimension name of a fact plugin: its name, prefixed by its subcategory.
pub fn fact_dimension(plugin: &Plugin) -> String {
    if plugin.subcategory.is_empty() {
        plugin.name.clone()
    } else {
        format!("{}/{}", plugin.subcategory, plugin.name)
    }
}

/// Whether an entry is a usable fact.
pub fn is_fact(entry: &ResultEntry, fact_category: &str) -> bool {
    entry.plugin.category == fact_category
        && matches!(entry.status(), Status::Okay | Status::Info)
        && !entry.result.value().is_empty()
}

/// Build the fact table of a fleet.
pub fn extract_facts(hosts: &BTreeMap<HostId, ResultSet>, fact_category: &str) -> FactTable {
    let mut table = FactTable::default();
    for (host, set) in hosts {
        for entry in set.iter().filter(|e| is_fact(e, fact_category)) {
            table.record(&fact_dimension(&entry.plugin), entry.result.value(), host);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginMetadata;
    use crate::results::ExecutionResult;
    use std::path::PathBuf;

    fn fact(name: &str, status: Status, value: &str) -> ResultEntry {
        let plugin = Plugin {
            id: name.into(),
            path: PathBuf::from(format!("/p/core/metadata/system/{}.sh", name)),
            backend: "core".into(),
            category: "metadata".into(),
            subcategory: "system".into(),
            name: name.into(),
            content_hash: String::new(),
            metadata: PluginMetadata::default(),
        };
        ResultEntry::new(plugin, ExecutionResult::new(status, "", value))
    }

    #[test]
    fn groups_hosts_by_value() {
        let mut hosts = BTreeMap::new();
        for (host, release) in [("h1", "8.4"), ("h2", "8.4"), ("h3", "8.6")] {
            let set: ResultSet = std::iter::once(fact("release", Status::Okay, release)).collect();
            hosts.insert(host.to_string(), set);
        }

        let table = extract_facts(&hosts, "metadata");
        let values = table.values("system/release").unwrap();

        assert_eq!(values["8.4"].len(), 2);
        assert!(values["8.6"].contains("h3"));
    }

    #[test]
    fn skipped_and_empty_facts_are_ignored() {
        let mut hosts = BTreeMap::new();
        hosts.insert(
            "h1".to_string(),
            vec![fact("role", Status::Skipped, "compute"), fact("zone", Status::Okay, "  ")]
                .into_iter()
                .collect::<ResultSet>(),
        );

        assert!(extract_facts(&hosts, "metadata").is_empty());
    }
}
