//! Plugin filtering by priority and path substrings.

use super::Plugin;

/// Filters applied during discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginFilter {
    /// Minimum priority; units below it are excluded.
    pub priority: u32,

    /// Keep only paths containing at least one of these substrings.
    pub include: Vec<String>,

    /// Drop paths containing any of these substrings.
    pub exclude: Vec<String>,
}

impl PluginFilter {
    /// Create a filter that admits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Add an include substring.
    pub fn include(mut self, fragment: impl Into<String>) -> Self {
        self.include.push(fragment.into());
        self
    }

    /// Add an exclude substring.
    pub fn exclude(mut self, fragment: impl Into<String>) -> Self {
        self.exclude.push(fragment.into());
        self
    }

    /// Check the include/exclude rules against a path.
    pub fn admits_path(&self, path: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|f| path.contains(f.as_str())) {
            return false;
        }
        !self.exclude.iter().any(|f| path.contains(f.as_str()))
    }

    /// Check every rule against a discovered plugin.
    pub fn admits(&self, plugin: &Plugin) -> bool {
        plugin.metadata.priority >= self.priority && self.admits_path(&plugin.path_str())
    }
}
