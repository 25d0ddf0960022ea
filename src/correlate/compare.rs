//! Cross-host comparators.
//!
//! A comparator selects the checks it understands, looks at their per-host
//! values within one group, and returns at most one [`Verdict`]. Hosts whose
//! result is `SKIPPED` do not take part; a check skipped everywhere is
//! inconclusive and yields nothing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::facts::{fact_dimension, is_fact};
use super::HostId;
use crate::error::Result;
use crate::exec::Status;
use crate::results::ResultSet;

/// One host's outcome for a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSample {
    pub host: HostId,
    pub status: Status,
    pub value: String,
}

/// All samples of one check within a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSamples {
    pub id: String,
    pub path: String,
    pub category: String,
    /// Fact dimension, when the check is a fact.
    pub dimension: Option<String>,
    pub samples: Vec<HostSample>,
}

impl CheckSamples {
    /// Samples that did not skip.
    pub fn conclusive(&self) -> impl Iterator<Item = &HostSample> {
        self.samples.iter().filter(|s| s.status != Status::Skipped)
    }

    /// Distinct non-skipped values.
    pub fn distinct_values(&self) -> BTreeSet<&str> {
        self.conclusive().map(|s| s.value.as_str()).collect()
    }
}

/// Gather samples of every check for the given member hosts.
pub fn collect_samples(
    hosts: &BTreeMap<HostId, ResultSet>,
    members: &BTreeSet<HostId>,
    fact_category: &str,
) -> Vec<CheckSamples> {
    let mut checks: BTreeMap<String, CheckSamples> = BTreeMap::new();

    for host in members {
        let Some(set) = hosts.get(host) else {
            continue;
        };
        for entry in set.iter() {
            let check = checks
                .entry(entry.id().to_string())
                .or_insert_with(|| CheckSamples {
                    id: entry.id().to_string(),
                    path: entry.plugin.path_str(),
                    category: entry.plugin.category.clone(),
                    dimension: (entry.plugin.category == fact_category)
                        .then(|| fact_dimension(&entry.plugin)),
                    samples: Vec::new(),
                });
            if check.dimension.is_some()
                && !is_fact(entry, fact_category)
                && entry.status() != Status::Skipped
            {
                // Failed fact probes carry no comparable value
                continue;
            }
            check.samples.push(HostSample {
                host: host.clone(),
                status: entry.status(),
                value: entry.result.value().to_string(),
            });
        }
    }

    checks.into_values().collect()
}

/// Outcome of one comparator for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub comparator: String,
    pub status: Status,
    pub message: String,
    /// Paths of the checks that failed the comparison.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<String>,
}

/// A cross-host comparison.
pub trait Comparator: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this comparator handles `check`.
    fn selects(&self, check: &CheckSamples) -> bool;

    /// Compare the selected checks. `Ok(None)` means inconclusive.
    fn compare(&self, checks: &[&CheckSamples]) -> Result<Option<Verdict>>;
}

/// Fold per-check findings into one verdict.
///
/// `finding` returns `None` for inconclusive checks, `Some(None)` for a
/// passing check and `Some(Some(line))` for a failing one.
fn fold_verdict(
    comparator: &str,
    checks: &[&CheckSamples],
    finding: impl Fn(&CheckSamples) -> Option<Option<String>>,
) -> Option<Verdict> {
    let mut conclusive = false;
    let mut lines = Vec::new();
    let mut failing = Vec::new();

    for check in checks {
        match finding(check) {
            None => {}
            Some(None) => conclusive = true,
            Some(Some(line)) => {
                conclusive = true;
                lines.push(line);
                failing.push(check.path.clone());
            }
        }
    }

    if !conclusive {
        return None;
    }

    let status = if lines.is_empty() {
        Status::Okay
    } else {
        Status::Failed
    };
    Some(Verdict {
        comparator: comparator.to_string(),
        status,
        message: lines.join("\n"),
        checks: failing,
    })
}

/// Values are expected to match across hosts.
pub struct PositiveAffinity {
    markers: Vec<String>,
    consistent_facts: Vec<String>,
}

impl PositiveAffinity {
    pub const NAME: &'static str = "positive-affinity";

    pub fn new(markers: Vec<String>, consistent_facts: Vec<String>) -> Self {
        Self {
            markers,
            consistent_facts,
        }
    }
}

impl Default for PositiveAffinity {
    fn default() -> Self {
        Self::new(vec!["faraday/positive".to_string()], vec!["release".to_string()])
    }
}

impl Comparator for PositiveAffinity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn selects(&self, check: &CheckSamples) -> bool {
        if self.markers.iter().any(|m| check.path.contains(m.as_str())) {
            return true;
        }
        check.dimension.as_deref().is_some_and(|dim| {
            self.consistent_facts
                .iter()
                .any(|f| dim == f || dim.ends_with(&format!("/{}", f)))
        })
    }

    fn compare(&self, checks: &[&CheckSamples]) -> Result<Option<Verdict>> {
        Ok(fold_verdict(Self::NAME, checks, |check| {
            // A check seen on a single host has nothing to agree with
            if check.conclusive().count() < 2 {
                None
            } else if check.distinct_values().len() > 1 {
                Some(Some(format!("{} contents differ across hosts", check.path)))
            } else {
                Some(None)
            }
        }))
    }
}

/// Values are expected to differ between hosts (per-host identifiers).
pub struct NegativeAffinity {
    markers: Vec<String>,
}

impl NegativeAffinity {
    pub const NAME: &'static str = "negative-affinity";

    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }
}

impl Default for NegativeAffinity {
    fn default() -> Self {
        Self::new(vec!["faraday/negative".to_string()])
    }
}

impl Comparator for NegativeAffinity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn selects(&self, check: &CheckSamples) -> bool {
        self.markers.iter().any(|m| check.path.contains(m.as_str()))
    }

    fn compare(&self, checks: &[&CheckSamples]) -> Result<Option<Verdict>> {
        Ok(fold_verdict(Self::NAME, checks, |check| {
            let hosts = check.conclusive().count();
            if hosts < 2 {
                None
            } else if check.distinct_values().len() == 1 {
                Some(Some(format!("{} is identical across hosts", check.path)))
            } else {
                Some(None)
            }
        }))
    }
}

/// Reports checks that failed on any host of the group.
pub struct FailedOutputs {
    fact_category: String,
}

impl FailedOutputs {
    pub const NAME: &'static str = "failed-outputs";

    pub fn new(fact_category: impl Into<String>) -> Self {
        Self {
            fact_category: fact_category.into(),
        }
    }
}

impl Comparator for FailedOutputs {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn selects(&self, check: &CheckSamples) -> bool {
        check.category != self.fact_category
    }

    fn compare(&self, checks: &[&CheckSamples]) -> Result<Option<Verdict>> {
        Ok(fold_verdict(Self::NAME, checks, |check| {
            if check.conclusive().next().is_none() {
                return None;
            }
            let failed: Vec<&str> = check
                .conclusive()
                .filter(|s| s.status.is_problem())
                .map(|s| s.host.as_str())
                .collect();
            if failed.is_empty() {
                Some(None)
            } else {
                Some(Some(format!("{}: {}", check.path, failed.join(", "))))
            }
        }))
    }
}
