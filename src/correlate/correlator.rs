//! Fleet correlation driver.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use super::compare::{collect_samples, CheckSamples};
use super::facts::extract_facts;
use super::group::{build_groups, GroupScheduler};
use super::{
    Comparator, CorrelationReport, FailedOutputs, GroupReport, HostId, NegativeAffinity,
    PositiveAffinity, Verdict,
};
use crate::error::{FleetcheckError, Result};
use crate::results::ResultSet;

/// Runs comparators over the fleet and its fact groups.
pub struct Correlator {
    comparators: Vec<Box<dyn Comparator>>,
    fact_category: String,
}

impl Correlator {
    /// Correlator without comparators.
    pub fn new(fact_category: impl Into<String>) -> Self {
        Self {
            comparators: Vec::new(),
            fact_category: fact_category.into(),
        }
    }

    /// Correlator with the built-in comparators.
    pub fn builtin(fact_category: impl Into<String>, consistent_facts: Vec<String>) -> Self {
        let fact_category = fact_category.into();
        let mut correlator = Self::new(fact_category.clone());
        correlator.register(Box::new(PositiveAffinity::new(
            vec!["faraday/positive".to_string()],
            consistent_facts,
        )));
        correlator.register(Box::new(NegativeAffinity::default()));
        correlator.register(Box::new(FailedOutputs::new(fact_category)));
        correlator
    }

    pub fn register(&mut self, comparator: Box<dyn Comparator>) {
        self.comparators.push(comparator);
    }

    pub fn fact_category(&self) -> &str {
        &self.fact_category
    }

    /// Correlate one result set per host.
    ///
    /// Hosts are dropped from the working set once no pending group refers
    /// to them.
    pub fn correlate(&self, hosts: BTreeMap<HostId, ResultSet>) -> Result<CorrelationReport> {
        if hosts.len() < 2 {
            return Err(FleetcheckError::InvalidArgument {
                message: format!("correlation needs at least 2 hosts, got {}", hosts.len()),
            });
        }

        let mut working = hosts;
        let all: BTreeSet<HostId> = working.keys().cloned().collect();

        let mut report = CorrelationReport {
            fleet: self.evaluate("fleet", &working, &all),
            groups: BTreeMap::new(),
        };

        let facts = extract_facts(&working, &self.fact_category);
        let groups = build_groups(&facts, all.len());
        tracing::debug!("Built {} groups from {} hosts", groups.len(), all.len());

        let mut scheduler = GroupScheduler::new(groups);
        let mut processed: Vec<(BTreeSet<HostId>, String)> = Vec::new();

        while let Some(group) = scheduler.next() {
            let reuse = processed
                .iter()
                .find(|(hosts, _)| *hosts == group.hosts)
                .map(|(_, name)| name.clone());

            let group_report = match reuse.and_then(|name| {
                report.groups.get(&name).map(|prior| (name, prior.clone()))
            }) {
                Some((name, prior)) => {
                    tracing::debug!("Reusing {} for {}", name, group.name);
                    GroupReport {
                        reused_from: Some(name),
                        ..prior
                    }
                }
                None => self.evaluate(&group.name, &working, &group.hosts),
            };

            processed.push((group.hosts.clone(), group.name.clone()));
            report.groups.insert(group.name, group_report);

            let needed = scheduler.hosts_needed();
            working.retain(|host, _| {
                let keep = needed.contains(host);
                if !keep {
                    tracing::debug!("Releasing results of {}", host);
                }
                keep
            });
        }

        Ok(report)
    }

    /// Run every comparator over `members`.
    pub fn evaluate(
        &self,
        group: &str,
        hosts: &BTreeMap<HostId, ResultSet>,
        members: &BTreeSet<HostId>,
    ) -> GroupReport {
        let checks = collect_samples(hosts, members, &self.fact_category);

        let verdicts: Vec<Verdict> = self
            .comparators
            .par_iter()
            .filter_map(|comparator| self.run_comparator(group, comparator.as_ref(), &checks))
            .collect();

        GroupReport {
            hosts: members.iter().cloned().collect(),
            verdicts,
            reused_from: None,
        }
    }

    fn run_comparator(
        &self,
        group: &str,
        comparator: &dyn Comparator,
        checks: &[CheckSamples],
    ) -> Option<Verdict> {
        let selected: Vec<&CheckSamples> = checks.iter().filter(|c| comparator.selects(c)).collect();
        if selected.is_empty() {
            return None;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| comparator.compare(&selected)));
        let failure = match outcome {
            Ok(Ok(verdict)) => return verdict,
            Ok(Err(e)) => e.to_string(),
            Err(_) => "panicked".to_string(),
        };

        let err = FleetcheckError::Correlation {
            group: group.to_string(),
            comparator: comparator.name().to_string(),
            message: failure,
        };
        tracing::warn!("{}; verdict omitted", err);
        None
    }
}
