//! Correlation output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{HostId, Verdict};
use crate::exec::Status;
use crate::results::{RunMetadata, CORRELATE_SOURCE};

/// Verdicts for one set of hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub hosts: Vec<HostId>,
    pub verdicts: Vec<Verdict>,
    /// Group whose output was reused because it had the same hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reused_from: Option<String>,
}

impl GroupReport {
    /// Verdicts reporting a problem.
    pub fn problems(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.status.is_problem())
    }

    /// Worst verdict status, `OKAY` when there are none.
    pub fn status(&self) -> Status {
        if self.problems().next().is_some() {
            Status::Failed
        } else {
            Status::Okay
        }
    }
}

/// Result of correlating a fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Verdicts over every host.
    pub fleet: GroupReport,
    /// Verdicts per group, keyed by group name.
    pub groups: BTreeMap<String, GroupReport>,
}

/// Correlation report as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationDocument {
    pub metadata: RunMetadata,
    #[serde(flatten)]
    pub report: CorrelationReport,
}

impl CorrelationDocument {
    pub fn new(report: CorrelationReport, elapsed: f64) -> Self {
        let mut metadata = RunMetadata::new(false, CORRELATE_SOURCE, "");
        metadata.time = elapsed;
        Self { metadata, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_carries_correlate_source() {
        let doc = CorrelationDocument::new(CorrelationReport::default(), 0.5);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["metadata"]["source"], "fleetcheck-correlate");
        assert!(json.get("fleet").is_some());
        assert!(json.get("groups").is_some());
    }

    #[test]
    fn status_reflects_problems() {
        let mut report = GroupReport::default();
        assert_eq!(report.status(), Status::Okay);
        report.verdicts.push(Verdict {
            comparator: "failed-outputs".into(),
            status: Status::Failed,
            message: "x".into(),
            checks: vec![],
        });
        assert_eq!(report.status(), Status::Failed);
    }
}
