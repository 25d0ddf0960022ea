//! Ordered hook application.

use std::panic::{self, AssertUnwindSafe};

use super::Hook;
use crate::error::FleetcheckError;
use crate::results::ResultSet;

/// Hooks sorted by bucket, then name.
pub struct HookPipeline {
    hooks: Vec<Box<dyn Hook>>,
}

impl HookPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook, keeping the (priority, name) order.
    pub fn register(&mut self, hook: Box<dyn Hook>) {
        self.hooks.push(hook);
        self.hooks
            .sort_by(|a, b| (a.priority(), a.name()).cmp(&(b.priority(), b.name())));
    }

    /// Hook names in application order.
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Apply every hook in order.
    ///
    /// A hook that errors or panics is skipped: its output is discarded
    /// and the next hook receives the previous stage's set.
    pub fn apply(&self, set: ResultSet) -> ResultSet {
        let mut current = set;

        for hook in &self.hooks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook.apply(&current)));
            match outcome {
                Ok(Ok(next)) => {
                    tracing::debug!("Applied hook {}", hook.name());
                    current = next;
                }
                Ok(Err(e)) => {
                    tracing::warn!("{}; keeping previous results", e);
                }
                Err(_) => {
                    let err = FleetcheckError::Hook {
                        hook: hook.name().to_string(),
                        message: "panicked".to_string(),
                    };
                    tracing::warn!("{}; keeping previous results", err);
                }
            }
        }

        current
    }
}

impl Default for HookPipeline {
    fn default() -> Self {
        Self::new()
    }
}
