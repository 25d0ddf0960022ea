//! Mutually exclusive alternatives.
//!
//! Hosts use one of several equivalent services (ntpd or chronyd, say) and
//! the check for the unused one fails. A rule `{when_okay, skip}` marks the
//! `skip` unit `SKIPPED` whenever the `when_okay` unit passed. Both fields
//! are path suffixes.

use serde::{Deserialize, Serialize};

use super::Hook;
use crate::error::Result;
use crate::exec::Status;
use crate::results::{ExecutionResult, ResultSet};

/// One alternatives rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeRule {
    /// Path suffix of the unit whose success enables the rule.
    pub when_okay: String,

    /// Path suffix of the unit to skip.
    pub skip: String,
}

impl AlternativeRule {
    pub fn new(when_okay: impl Into<String>, skip: impl Into<String>) -> Self {
        Self {
            when_okay: when_okay.into(),
            skip: skip.into(),
        }
    }
}

pub struct Alternatives {
    rules: Vec<AlternativeRule>,
}

impl Alternatives {
    pub const NAME: &'static str = "alternatives";

    pub fn new(rules: Vec<AlternativeRule>) -> Self {
        Self { rules }
    }
}

impl Hook for Alternatives {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> u32 {
        5
    }

    fn apply(&self, set: &ResultSet) -> Result<ResultSet> {
        let mut out = set.clone();

        for rule in &self.rules {
            let enabled = set
                .find_by_path_suffix(&rule.when_okay)
                .is_some_and(|e| e.status() == Status::Okay);

            let Some(target_id) = set
                .find_by_path_suffix(&rule.skip)
                .map(|e| e.id().to_string())
            else {
                continue;
            };
            let Some(target) = out.get_mut(&target_id) else {
                continue;
            };

            let applied = target.last_override_by(Self::NAME).is_some();
            if enabled && !applied {
                let replacement = ExecutionResult::new(
                    Status::Skipped,
                    target.result.stdout.clone(),
                    format!(
                        "Marked as skipped by hook {}: {} is okay",
                        Self::NAME,
                        rule.when_okay
                    ),
                );
                target.overwrite(Self::NAME, replacement);
            } else if !enabled && applied {
                // Reused result whose condition no longer holds
                target.restore(Self::NAME);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Plugin, PluginMetadata};
    use crate::results::ResultEntry;
    use std::path::PathBuf;

    fn entry(id: &str, path: &str, status: Status) -> ResultEntry {
        let plugin = Plugin {
            id: id.into(),
            path: PathBuf::from(path),
            backend: "core".into(),
            category: "system".into(),
            subcategory: String::new(),
            name: id.into(),
            content_hash: String::new(),
            metadata: PluginMetadata::default(),
        };
        ResultEntry::new(plugin, ExecutionResult::new(status, "", ""))
    }

    fn hook() -> Alternatives {
        Alternatives::new(vec![AlternativeRule::new(
            "system/clock-ntpd.sh",
            "system/clock-chronyd.sh",
        )])
    }

    fn set(ntpd: Status) -> ResultSet {
        vec![
            entry("ntpd", "/p/core/system/clock-ntpd.sh", ntpd),
            entry("chronyd", "/p/core/system/clock-chronyd.sh", Status::Failed),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn skips_alternative_when_condition_holds() {
        let out = hook().apply(&set(Status::Okay)).unwrap();
        let chronyd = out.get("chronyd").unwrap();
        assert_eq!(chronyd.status(), Status::Skipped);
        assert_eq!(chronyd.datahook.prior[0].result.status, Status::Failed);
    }

    #[test]
    fn leaves_alternative_when_condition_fails() {
        let input = set(Status::Failed);
        assert_eq!(hook().apply(&input).unwrap(), input);
    }

    #[test]
    fn idempotent() {
        let once = hook().apply(&set(Status::Okay)).unwrap();
        let twice = hook().apply(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn restores_when_condition_stops_holding() {
        let mut applied = hook().apply(&set(Status::Okay)).unwrap();
        applied.insert(entry("ntpd", "/p/core/system/clock-ntpd.sh", Status::Failed));

        let out = hook().apply(&applied).unwrap();
        let chronyd = out.get("chronyd").unwrap();
        assert_eq!(chronyd.status(), Status::Failed);
        assert!(chronyd.datahook.prior.is_empty());
    }

    #[test]
    fn missing_units_are_ignored() {
        let input: ResultSet = std::iter::once(entry("x", "/p/core/x.sh", Status::Okay)).collect();
        assert_eq!(hook().apply(&input).unwrap(), input);
    }
}
