//! Backend adapters.
//!
//! A backend knows how to recognize one family of units, read their
//! metadata, and run them. The set is closed and registered at startup:
//!
//! - [`AnsibleAdapter`] - `.yml`/`.yaml` playbooks below an `ansible` directory
//! - [`NagiosAdapter`] - executables under a `nagios` directory, Nagios exit codes
//! - [`CoreAdapter`] - any other executable, codes from the run context
//!
//! Registration order decides ownership: the first adapter whose
//! [`Adapter::matches`] accepts a path owns it.

pub mod ansible;
pub mod core;
pub mod nagios;

pub use self::ansible::AnsibleAdapter;
pub use self::core::CoreAdapter;
pub use self::nagios::NagiosAdapter;

use std::path::Path;

use crate::error::Result;
use crate::exec::{RawResult, RunContext, Status, StatusCodes};
use crate::plugin::{read_header, Plugin, PluginMetadata};

/// One family of check units.
pub trait Adapter: Send + Sync {
    /// Backend name stored on every plugin it owns.
    fn name(&self) -> &'static str;

    /// Whether this adapter owns the file at `path`.
    fn matches(&self, path: &Path) -> bool;

    /// Extract metadata. Never fails; unreadable fields default.
    fn metadata(&self, path: &Path) -> PluginMetadata {
        read_header(path)
    }

    /// Run one unit.
    ///
    /// An `Err` means the unit could not be launched; the scheduler turns it
    /// into an `ERROR` result.
    fn run(&self, plugin: &Plugin, ctx: &RunContext) -> Result<RawResult>;

    /// Map an exit code to a status.
    fn classify(&self, code: i32, codes: &StatusCodes) -> Status {
        codes.classify(code)
    }
}

/// Ordered set of adapters.
pub struct BackendRegistry {
    adapters: Vec<Box<dyn Adapter>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Registry with the built-in adapters in ownership order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AnsibleAdapter::new()));
        registry.register(Box::new(NagiosAdapter));
        registry.register(Box::new(CoreAdapter));
        registry
    }

    /// Append an adapter. Earlier adapters win ownership.
    pub fn register(&mut self, adapter: Box<dyn Adapter>) {
        self.adapters.push(adapter);
    }

    /// First adapter that matches `path`.
    pub fn claim(&self, path: &Path) -> Option<&dyn Adapter> {
        self.adapters
            .iter()
            .find(|a| a.matches(path))
            .map(|a| a.as_ref())
    }

    /// Adapter by name.
    pub fn get(&self, name: &str) -> Option<&dyn Adapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Adapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Whether any directory component of `path` equals `name`.
pub(crate) fn has_component(path: &Path, name: &str) -> bool {
    path.parent()
        .map(|p| p.components().any(|c| c.as_os_str() == name))
        .unwrap_or(false)
}
