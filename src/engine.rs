//! Library entry points.
//!
//! [`Engine`] wires the catalog, cache, scheduler, hook pipeline and
//! correlator together:
//!
//! ```text
//! discover -> plan -> schedule -> hooks -> persist
//! ```
//!
//! ```no_run
//! use fleetcheck::config::EngineConfig;
//! use fleetcheck::engine::Engine;
//! use fleetcheck::exec::Target;
//!
//! let engine = Engine::new(EngineConfig::default());
//! let plugins = engine.discover()?;
//! let outcome = engine.execute(&Target::Snapshot("/tmp/sosreport".into()), &plugins, false)?;
//! println!("{} results", outcome.results.len());
//! # Ok::<(), fleetcheck::error::FleetcheckError>(())
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::backend::BackendRegistry;
use crate::cache::{plan, ExecutionPlan, ResultStore};
use crate::config::EngineConfig;
use crate::correlate::{CorrelationReport, Correlator, HostId};
use crate::error::{FleetcheckError, Result};
use crate::exec::{RunContext, Scheduler, StatusCodes, Target};
use crate::hooks::{load_profiles, HookPipeline};
use crate::plugin::{self, Plugin, PluginFilter};
use crate::results::{ResultSet, RunMetadata, RUN_SOURCE};

/// Summary of one single-host run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Complete result set after hooks.
    pub results: ResultSet,

    /// Ids of plugins that actually executed.
    pub executed: Vec<String>,

    /// Number of plugins satisfied by the previous run.
    pub reused: usize,

    /// Ids dropped from the previous run.
    pub pruned: Vec<String>,

    /// Where the results were written, if they were.
    pub persisted: Option<PathBuf>,

    /// Wall-clock seconds.
    pub elapsed: f64,
}

/// The check engine.
pub struct Engine {
    config: EngineConfig,
    registry: BackendRegistry,
    pipeline: HookPipeline,
    correlator: Correlator,
    codes: StatusCodes,
}

impl Engine {
    /// Engine with the built-in backends, hooks and comparators.
    pub fn new(config: EngineConfig) -> Self {
        let pipeline = HookPipeline::builtin(
            config.aggregate_markers.clone(),
            config.alternatives.clone(),
            load_profiles(&config.profile_roots),
        );
        let correlator =
            Correlator::builtin(config.fact_category.clone(), config.consistent_facts.clone());
        Self {
            config,
            registry: BackendRegistry::builtin(),
            pipeline,
            correlator,
            codes: StatusCodes::process(),
        }
    }

    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_pipeline(mut self, pipeline: HookPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_correlator(mut self, correlator: Correlator) -> Self {
        self.correlator = correlator;
        self
    }

    pub fn with_codes(mut self, codes: StatusCodes) -> Self {
        self.codes = codes;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Plugin roots, canonicalized where possible.
    pub fn plugin_roots(&self) -> Vec<PathBuf> {
        self.config
            .plugin_roots
            .iter()
            .map(|root| fs::canonicalize(root).unwrap_or_else(|_| root.clone()))
            .collect()
    }

    /// Discover plugins with the configured roots and filters.
    pub fn discover(&self) -> Result<Vec<Plugin>> {
        plugin::discover(&self.plugin_roots(), &self.registry, &self.config.filter())
    }

    /// Discover and execute in one step.
    pub fn run(&self, target: &Target, force: bool) -> Result<RunOutcome> {
        let plugins = self.discover()?;
        self.execute(target, &plugins, force)
    }

    /// Execute `plugins` against `target`.
    ///
    /// Snapshot runs reuse and update the results document inside the
    /// snapshot; live runs always execute everything and persist nothing.
    /// A failure to write the document is logged and the results are still
    /// returned.
    pub fn execute(&self, target: &Target, plugins: &[Plugin], force: bool) -> Result<RunOutcome> {
        let started = Instant::now();

        let target = match target {
            Target::Live => Target::Live,
            Target::Snapshot(path) => {
                if !path.is_dir() {
                    return Err(FleetcheckError::InvalidArgument {
                        message: format!("snapshot {} is not a directory", path.display()),
                    });
                }
                Target::Snapshot(fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
            }
        };

        let store = target
            .root()
            .map(|root| ResultStore::for_snapshot(root, &self.config.results_file));

        let previous = match &store {
            Some(store) if !force => match store.load() {
                Ok(previous) => previous,
                Err(e) => {
                    tracing::warn!("{}; running every plugin", e);
                    None
                }
            },
            _ => None,
        };

        let planned = if target.is_live() {
            ExecutionPlan::everything(plugins)
        } else {
            plan(plugins, previous.as_ref(), force)
        };
        tracing::info!(
            "{} plugins to run, {} reused, {} pruned",
            planned.to_run.len(),
            planned.reused.len(),
            planned.to_prune.len()
        );

        let base = self.plugin_roots().into_iter().next().unwrap_or_default();
        let ctx = RunContext::new(target.clone(), base, self.codes)
            .with_lang(self.config.lang.clone())
            .with_timeout(self.config.timeout());

        let fresh = Scheduler::new(&self.registry)
            .with_jobs(self.config.jobs)
            .run(&planned.to_run, &ctx);

        let mut results = previous.unwrap_or_default();
        for id in &planned.to_prune {
            results.remove(id);
        }
        results.extend(fresh);

        let results = self.pipeline.apply(results);
        let elapsed = started.elapsed().as_secs_f64();

        let persisted = store.and_then(|store| {
            let path = target
                .root()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut metadata = RunMetadata::new(false, RUN_SOURCE, path);
            metadata.time = elapsed;
            match store.save(&results, metadata) {
                Ok(()) => Some(store.path().to_path_buf()),
                Err(e) => {
                    tracing::error!("{}", e);
                    None
                }
            }
        });

        Ok(RunOutcome {
            results,
            executed: planned.to_run.iter().map(|p| p.id.clone()).collect(),
            reused: planned.reused.len(),
            pruned: planned.to_prune,
            persisted,
            elapsed,
        })
    }

    /// Load a stored result set from a snapshot directory or document.
    pub fn load_results(&self, path: &Path) -> Result<ResultSet> {
        let store = ResultStore::locate(path, &self.config.results_file);
        store.load()?.ok_or_else(|| FleetcheckError::InvalidArgument {
            message: format!("no results found at {}", store.path().display()),
        })
    }

    /// Correlate one result set per host.
    pub fn correlate(&self, hosts: BTreeMap<HostId, ResultSet>) -> Result<CorrelationReport> {
        self.correlator.correlate(hosts)
    }

    /// Correlate stored results, optionally running each snapshot first.
    pub fn correlate_paths(&self, paths: &[PathBuf], run: bool) -> Result<CorrelationReport> {
        let plugins = if run { Some(self.discover()?) } else { None };

        let mut hosts = BTreeMap::new();
        for path in paths {
            let results = match &plugins {
                Some(plugins) => {
                    self.execute(&Target::Snapshot(path.clone()), plugins, false)?
                        .results
                }
                None => self.load_results(path)?,
            };
            let mut host = host_id(path);
            if hosts.contains_key(&host) {
                host = path.display().to_string();
            }
            hosts.insert(host, results);
        }

        self.correlate(hosts)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Host id for a results path: the snapshot directory name.
pub fn host_id(path: &Path) -> HostId {
    let dir = if path.is_file() {
        path.parent().unwrap_or(path)
    } else {
        path
    };
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Discover plugins below `roots` with the built-in backends.
pub fn discover(roots: &[PathBuf], filter: &PluginFilter) -> Result<Vec<Plugin>> {
    plugin::discover(roots, &BackendRegistry::builtin(), filter)
}

/// Execute plugins with the default configuration.
pub fn execute(target: &Target, plugins: &[Plugin], force: bool) -> Result<ResultSet> {
    Engine::default()
        .execute(target, plugins, force)
        .map(|outcome| outcome.results)
}

/// Correlate hosts with the default configuration.
pub fn correlate(hosts: BTreeMap<HostId, ResultSet>) -> Result<CorrelationReport> {
    Engine::default().correlate(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn snapshot_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let err = Engine::default()
            .execute(&Target::Snapshot(temp.path().join("missing")), &[], false)
            .unwrap_err();
        assert!(matches!(err, FleetcheckError::InvalidArgument { .. }));
    }

    #[test]
    fn empty_run_persists_empty_document() {
        let temp = TempDir::new().unwrap();
        let outcome = Engine::default()
            .execute(&Target::Snapshot(temp.path().to_path_buf()), &[], false)
            .unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.persisted.is_some());
        assert!(temp.path().join("fleetcheck.json").is_file());
    }

    #[test]
    fn host_id_uses_directory_name() {
        let temp = TempDir::new().unwrap();
        let snap = temp.path().join("host-a");
        fs::create_dir_all(&snap).unwrap();
        let doc = snap.join("fleetcheck.json");
        fs::write(&doc, "{}").unwrap();

        assert_eq!(host_id(&snap), "host-a");
        assert_eq!(host_id(&doc), "host-a");
    }

    #[test]
    fn missing_results_are_invalid_argument() {
        let temp = TempDir::new().unwrap();
        let err = Engine::default().load_results(temp.path()).unwrap_err();
        assert!(matches!(err, FleetcheckError::InvalidArgument { .. }));
    }
}
