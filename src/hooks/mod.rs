//! Result hooks.
//!
//! A hook is a total `ResultSet -> ResultSet` transform applied after all
//! units of a run have finished and before the set is persisted. Hooks run
//! in ascending bucket order, then by name. Built-in hooks:
//!
//! | Hook | Bucket | Effect |
//! |------|--------|--------|
//! | [`Alternatives`] | 5 | skip a unit when its alternative passed |
//! | [`ExpandAggregate`] | 9 | split `key:value;...` output into synthetic entries |
//! | [`SkipKilled`] | 9 | killed units become `SKIPPED` |
//! | [`Profiles`] | 10 | one summary entry per profile definition |
//!
//! Hooks are re-applied to reused results on every run, so each one must
//! leave an already transformed set unchanged.

pub mod alternatives;
pub mod expand;
pub mod pipeline;
pub mod profiles;
pub mod skip_killed;

pub use alternatives::{AlternativeRule, Alternatives};
pub use expand::{ExpandAggregate, DEFAULT_AGGREGATE_MARKERS};
pub use pipeline::HookPipeline;
pub use profiles::{load_profiles, Profile, Profiles};
pub use skip_killed::SkipKilled;

use crate::error::Result;
use crate::results::ResultSet;

/// A result set transform.
pub trait Hook: Send + Sync {
    /// Name used for ordering and in `datahook.prior`.
    fn name(&self) -> &str;

    /// Bucket; lower runs first.
    fn priority(&self) -> u32;

    /// Produce the transformed set. Must not fail on missing entries.
    fn apply(&self, set: &ResultSet) -> Result<ResultSet>;
}

impl HookPipeline {
    /// Pipeline with the built-in hooks.
    pub fn builtin(
        aggregate_markers: Vec<String>,
        alternatives: Vec<AlternativeRule>,
        profiles: Vec<Profile>,
    ) -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Box::new(SkipKilled));
        pipeline.register(Box::new(ExpandAggregate::new(aggregate_markers)));
        pipeline.register(Box::new(Alternatives::new(alternatives)));
        pipeline.register(Box::new(Profiles::new(profiles)));
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order() {
        let pipeline = HookPipeline::builtin(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(
            pipeline.names(),
            vec!["alternatives", "expand-aggregate", "skip-killed", "profiles"]
        );
    }
}
