//! Bounded-concurrency execution of plugins.
//!
//! Each plugin runs as one task on a rayon pool sized by `jobs`. Tasks
//! share nothing but the read-only [`RunContext`]. `run` returns only when
//! every task has finished, so hooks always see a complete result set.

use std::time::Instant;

use rayon::prelude::*;

use super::RunContext;
use crate::backend::BackendRegistry;
use crate::plugin::Plugin;
use crate::results::{ExecutionResult, ResultEntry, ResultSet};

/// Runs plugins through their backend adapters.
pub struct Scheduler<'a> {
    registry: &'a BackendRegistry,
    jobs: usize,
}

impl<'a> Scheduler<'a> {
    /// Scheduler with one worker per CPU.
    pub fn new(registry: &'a BackendRegistry) -> Self {
        Self {
            registry,
            jobs: num_cpus::get(),
        }
    }

    /// Override the worker count. `None` keeps the CPU count.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if let Some(jobs) = jobs {
            self.jobs = jobs.max(1);
        }
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run every plugin and collect the results.
    pub fn run(&self, plugins: &[Plugin], ctx: &RunContext) -> ResultSet {
        tracing::debug!(
            "Running {} plugins with {} workers",
            plugins.len(),
            self.jobs
        );

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!("Cannot start worker pool, running sequentially: {}", e);
                return plugins.iter().map(|p| self.run_one(p, ctx)).collect();
            }
        };

        let entries: Vec<ResultEntry> = pool.install(|| {
            plugins
                .par_iter()
                .map(|plugin| self.run_one(plugin, ctx))
                .collect()
        });
        entries.into_iter().collect()
    }

    /// Run a single plugin. Never fails: launch problems become `ERROR`.
    pub fn run_one(&self, plugin: &Plugin, ctx: &RunContext) -> ResultEntry {
        let started = Instant::now();

        let mut result = match self.registry.get(&plugin.backend) {
            None => {
                tracing::warn!(
                    "No backend '{}' for {}",
                    plugin.backend,
                    plugin.path.display()
                );
                ExecutionResult::error(format!("No backend named '{}'", plugin.backend))
            }
            Some(adapter) => match adapter.run(plugin, ctx) {
                Ok(raw) => ExecutionResult::from_raw(raw, |code| adapter.classify(code, &ctx.codes)),
                Err(e) => {
                    tracing::warn!("{}", e);
                    ExecutionResult::error(e.to_string())
                }
            },
        };

        if result.killed {
            tracing::warn!("Killed {} after timeout", plugin.path.display());
        }

        result.elapsed = started.elapsed().as_secs_f64();
        tracing::debug!(
            "{} -> {} ({:.2}s)",
            plugin.path.display(),
            result.status,
            result.elapsed
        );

        ResultEntry::new(plugin.clone(), result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::exec::{Status, StatusCodes, Target};
    use crate::plugin::{plugin_id, PluginMetadata};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn script(dir: &Path, name: &str, body: &str) -> Plugin {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        Plugin {
            id: plugin_id(&path),
            path,
            backend: "core".into(),
            category: String::new(),
            subcategory: String::new(),
            name: name.into(),
            content_hash: String::new(),
            metadata: PluginMetadata::default(),
        }
    }

    fn context(dir: &Path) -> RunContext {
        RunContext::new(
            Target::Snapshot(dir.to_path_buf()),
            dir,
            StatusCodes::fixed(10, 20, 30, 40),
        )
    }

    #[test]
    fn classifies_each_status() {
        let temp = TempDir::new().unwrap();
        let plugins = vec![
            script(temp.path(), "ok.sh", "#!/bin/sh\nexit $RC_OKAY\n"),
            script(temp.path(), "fail.sh", "#!/bin/sh\necho bad >&2\nexit $RC_FAILED\n"),
            script(temp.path(), "skip.sh", "#!/bin/sh\nexit $RC_SKIPPED\n"),
            script(temp.path(), "info.sh", "#!/bin/sh\nexit $RC_INFO\n"),
            script(temp.path(), "odd.sh", "#!/bin/sh\nexit 1\n"),
        ];
        let registry = BackendRegistry::builtin();

        let set = Scheduler::new(&registry)
            .with_jobs(Some(2))
            .run(&plugins, &context(temp.path()));

        let status_of = |name: &str| {
            set.iter()
                .find(|e| e.plugin.name == name)
                .map(|e| e.status())
                .unwrap()
        };
        assert_eq!(set.len(), 5);
        assert_eq!(status_of("ok.sh"), Status::Okay);
        assert_eq!(status_of("fail.sh"), Status::Failed);
        assert_eq!(status_of("skip.sh"), Status::Skipped);
        assert_eq!(status_of("info.sh"), Status::Info);
        assert_eq!(status_of("odd.sh"), Status::Error);
    }

    #[test]
    fn launch_failure_becomes_error_entry() {
        let temp = TempDir::new().unwrap();
        let mut plugin = script(temp.path(), "gone.sh", "#!/bin/sh\n");
        fs::remove_file(&plugin.path).unwrap();
        plugin.id = "gone".into();

        let registry = BackendRegistry::builtin();
        let entry = Scheduler::new(&registry).run_one(&plugin, &context(temp.path()));

        assert_eq!(entry.status(), Status::Error);
        assert!(!entry.result.stderr.is_empty());
    }

    #[test]
    fn unknown_backend_becomes_error_entry() {
        let temp = TempDir::new().unwrap();
        let mut plugin = script(temp.path(), "a.sh", "#!/bin/sh\nexit $RC_OKAY\n");
        plugin.backend = "golang".into();

        let registry = BackendRegistry::builtin();
        let entry = Scheduler::new(&registry).run_one(&plugin, &context(temp.path()));

        assert_eq!(entry.status(), Status::Error);
        assert!(entry.result.stderr.contains("golang"));
    }

    #[test]
    fn timeout_yields_killed_error() {
        let temp = TempDir::new().unwrap();
        let plugin = script(temp.path(), "hang.sh", "#!/bin/sh\nsleep 30\n");
        let ctx = context(temp.path()).with_timeout(Some(Duration::from_millis(200)));

        let registry = BackendRegistry::builtin();
        let entry = Scheduler::new(&registry).run_one(&plugin, &ctx);

        assert_eq!(entry.status(), Status::Error);
        assert!(entry.result.killed);
    }

    #[test]
    fn jobs_floor_is_one() {
        let registry = BackendRegistry::builtin();
        assert_eq!(Scheduler::new(&registry).with_jobs(Some(0)).jobs(), 1);
    }
}
