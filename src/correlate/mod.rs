//! Cross-host correlation.
//!
//! Takes one [`ResultSet`](crate::results::ResultSet) per host and:
//!
//! 1. extracts fact values from the fact category ([`extract_facts`])
//! 2. builds non-trivial host groups per fact value ([`build_groups`])
//! 3. processes groups in an order that releases hosts early
//!    ([`GroupScheduler`]), reusing output for repeated host sets
//! 4. runs the [`Comparator`]s over each group, in parallel
//!
//! A fleet-wide report over all hosts is produced as well.

pub mod compare;
pub mod correlator;
pub mod facts;
pub mod group;
pub mod report;

pub use compare::{
    collect_samples, CheckSamples, Comparator, FailedOutputs, HostSample, NegativeAffinity,
    PositiveAffinity, Verdict,
};
pub use correlator::Correlator;
pub use facts::{extract_facts, fact_dimension, FactTable};
pub use group::{build_groups, Group, GroupScheduler};
pub use report::{CorrelationDocument, CorrelationReport, GroupReport};

/// Opaque host identifier.
pub type HostId = String;
