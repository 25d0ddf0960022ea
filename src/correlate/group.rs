//! Host groups and their processing order.

use std::collections::{BTreeMap, BTreeSet};

use super::facts::FactTable;
use super::HostId;

/// Hosts sharing one fact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// `"{dimension}:{value}"`.
    pub name: String,
    pub dimension: String,
    pub value: String,
    pub hosts: BTreeSet<HostId>,
}

impl Group {
    pub fn new(dimension: &str, value: &str, hosts: BTreeSet<HostId>) -> Self {
        Self {
            name: format!("{}:{}", dimension, value),
            dimension: dimension.to_string(),
            value: value.to_string(),
            hosts,
        }
    }
}

/// Build every non-trivial group: more than one host, fewer than all.
pub fn build_groups(facts: &FactTable, total_hosts: usize) -> Vec<Group> {
    facts
        .iter()
        .filter(|(_, _, hosts)| hosts.len() > 1 && hosts.len() < total_hosts)
        .map(|(dim, value, hosts)| Group::new(dim, value, hosts.clone()))
        .collect()
}

/// Yields groups so that hosts stop being referenced as early as possible.
///
/// The next group is the one containing the host with the fewest other
/// pending groups; ties go to the smaller group, then to the name.
#[derive(Debug, Default)]
pub struct GroupScheduler {
    pending: Vec<Group>,
}

impl GroupScheduler {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { pending: groups }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Number of pending groups containing each host.
    fn memberships(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for group in &self.pending {
            for host in &group.hosts {
                *counts.entry(host.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Hosts referenced by at least one pending group.
    pub fn hosts_needed(&self) -> BTreeSet<HostId> {
        self.pending
            .iter()
            .flat_map(|g| g.hosts.iter().cloned())
            .collect()
    }

    fn next_index(&self) -> Option<usize> {
        let counts = self.memberships();
        self.pending
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let key = |g: &Group| {
                    let fewest = g
                        .hosts
                        .iter()
                        .map(|h| counts.get(h.as_str()).copied().unwrap_or(0))
                        .min()
                        .unwrap_or(0);
                    (fewest, g.hosts.len())
                };
                key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
            })
            .map(|(index, _)| index)
    }
}

impl Iterator for GroupScheduler {
    type Item = Group;

    fn next(&mut self) -> Option<Group> {
        let index = self.next_index()?;
        Some(self.pending.swap_remove(index))
    }
}
