//! Immutable run context shared by every task of a run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::StatusCodes;
use crate::plugin::Plugin;

/// What a run is executed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The running host.
    Live,
    /// A captured filesystem tree.
    Snapshot(PathBuf),
}

impl Target {
    /// Check for live mode.
    pub fn is_live(&self) -> bool {
        matches!(self, Target::Live)
    }

    /// Snapshot root, if any.
    pub fn root(&self) -> Option<&Path> {
        match self {
            Target::Live => None,
            Target::Snapshot(path) => Some(path),
        }
    }
}

/// Context handed to every task.
///
/// It is only turned into environment variables at the process boundary
/// ([`RunContext::env_for`]).
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Live host or snapshot.
    pub target: Target,

    /// Base directory of the plugin trees.
    pub base: PathBuf,

    /// Exit code assignment for this run.
    pub codes: StatusCodes,

    /// Locale exported to units.
    pub lang: String,

    /// Optional per-unit time limit.
    pub timeout: Option<Duration>,
}

impl RunContext {
    /// Create a context with no timeout.
    pub fn new(target: Target, base: impl Into<PathBuf>, codes: StatusCodes) -> Self {
        Self {
            target,
            base: base.into(),
            codes,
            lang: "en_US".to_string(),
            timeout: None,
        }
    }

    /// Set the locale.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the per-unit timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Environment for one unit invocation.
    pub fn env_for(&self, plugin: &Plugin) -> Vec<(String, String)> {
        let root = self
            .target
            .root()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let live = if self.target.is_live() { "1" } else { "0" };

        let mut env = vec![
            ("FLEETCHECK_ROOT".to_string(), root),
            ("FLEETCHECK_LIVE".to_string(), live.to_string()),
            (
                "FLEETCHECK_BASE".to_string(),
                self.base.to_string_lossy().into_owned(),
            ),
            (
                "PLUGIN_BASEDIR".to_string(),
                plugin.base_dir().to_string_lossy().into_owned(),
            ),
            ("LANG".to_string(), self.lang.clone()),
        ];
        env.extend(self.codes.env_vars());
        env
    }
}
