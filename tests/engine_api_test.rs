//! Integration tests for single-host runs through the engine API.
#![cfg(unix)]

use fleetcheck::config::EngineConfig;
use fleetcheck::exec::{Status, Target};
use fleetcheck::plugin::{plugin_id, PluginFilter};
use fleetcheck::results::ResultDocument;
use fleetcheck::{discover, Engine};
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const OKAY: &str = "#!/bin/sh\nexit $RC_OKAY\n";

fn script(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

struct Fixture {
    _temp: TempDir,
    plugins: PathBuf,
    snapshot: PathBuf,
}

impl Fixture {
    /// Plugins `a`, `b`, `c` below `plugins/core/system`, and an empty snapshot.
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let plugins = temp.path().join("plugins");
        for name in ["a", "b", "c"] {
            script(&plugins.join(format!("core/system/{}.sh", name)), OKAY);
        }
        let snapshot = temp.path().join("host1");
        fs::create_dir_all(&snapshot).unwrap();
        Self {
            _temp: temp,
            plugins,
            snapshot,
        }
    }

    fn engine(&self) -> Engine {
        Engine::new(EngineConfig {
            plugin_roots: vec![self.plugins.clone()],
            ..Default::default()
        })
    }

    fn plugin(&self, name: &str) -> PathBuf {
        fs::canonicalize(self.plugins.join(format!("core/system/{}.sh", name))).unwrap()
    }

    fn id(&self, name: &str) -> String {
        plugin_id(Path::new(&format!("core/system/{}.sh", name)))
    }

    fn target(&self) -> Target {
        Target::Snapshot(self.snapshot.clone())
    }

    fn document(&self) -> ResultDocument {
        let content = fs::read_to_string(self.snapshot.join("fleetcheck.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

#[test]
fn unmodified_tree_reuses_everything_and_edit_reruns_only_that_plugin() {
    let fixture = Fixture::new();
    let engine = fixture.engine();

    let first = engine.run(&fixture.target(), false).unwrap();
    assert_eq!(first.executed.len(), 3);
    assert_eq!(first.results.len(), 3);
    assert_eq!(first.results.count(Status::Okay), 3);
    assert_eq!(fixture.document().results.len(), 3);

    let second = engine.run(&fixture.target(), false).unwrap();
    assert!(second.executed.is_empty());
    assert_eq!(second.reused, 3);
    for entry in first.results.iter() {
        let again = second.results.get(entry.id()).unwrap();
        assert_eq!(again.plugin.content_hash, entry.plugin.content_hash);
        assert_eq!(again.result.status, entry.result.status);
        assert_eq!(again.result.stderr, entry.result.stderr);
    }

    fs::write(fixture.plugin("b"), "#!/bin/sh\n# edited\nexit $RC_OKAY\n").unwrap();
    let third = engine.run(&fixture.target(), false).unwrap();
    assert_eq!(third.executed, vec![fixture.id("b")]);
    assert_eq!(third.reused, 2);
}

#[test]
fn force_reruns_everything() {
    let fixture = Fixture::new();
    let engine = fixture.engine();

    engine.run(&fixture.target(), false).unwrap();
    let forced = engine.run(&fixture.target(), true).unwrap();
    assert_eq!(forced.executed.len(), 3);
}

#[test]
fn removed_plugin_is_pruned_from_document() {
    let fixture = Fixture::new();
    let engine = fixture.engine();

    engine.run(&fixture.target(), false).unwrap();
    let removed = fixture.id("c");
    fs::remove_file(fixture.plugin("c")).unwrap();

    let outcome = engine.run(&fixture.target(), false).unwrap();
    assert_eq!(outcome.pruned, vec![removed.clone()]);
    assert!(outcome.executed.is_empty());
    assert!(!fixture.document().results.contains_key(&removed));
    assert_eq!(fixture.document().results.len(), 2);
}

#[test]
fn ids_are_distinct_and_stable_across_discovery() {
    let fixture = Fixture::new();
    let roots = vec![fixture.plugins.clone()];

    let first = discover(&roots, &PluginFilter::new()).unwrap();
    let second = discover(&roots, &PluginFilter::new()).unwrap();

    let ids: Vec<&str> = first.iter().map(|p| p.id.as_str()).collect();
    let unique: BTreeSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 3);
    assert_eq!(
        ids,
        second.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
    );
}

#[test]
fn statuses_follow_assigned_codes() {
    let fixture = Fixture::new();
    script(
        &fixture.plugins.join("core/system/fails.sh"),
        "#!/bin/sh\necho 'ntpd is not running' >&2\nexit $RC_FAILED\n",
    );
    script(&fixture.plugins.join("core/system/skips.sh"), "#!/bin/sh\nexit $RC_SKIPPED\n");
    script(&fixture.plugins.join("core/system/odd.sh"), "#!/bin/sh\nexit 7\n");
    script(
        &fixture.plugins.join("core/system/root.sh"),
        "#!/bin/sh\n[ -n \"$FLEETCHECK_ROOT\" ] && exit $RC_INFO\nexit $RC_FAILED\n",
    );

    let outcome = fixture.engine().run(&fixture.target(), false).unwrap();
    let status_of = |name: &str| {
        outcome
            .results
            .get(&fixture.id(name))
            .unwrap()
            .status()
    };

    assert_eq!(status_of("fails"), Status::Failed);
    assert_eq!(status_of("skips"), Status::Skipped);
    assert_eq!(status_of("odd"), Status::Error);
    assert_eq!(status_of("root"), Status::Info);

    let failed = outcome
        .results
        .get(&fixture.id("fails"))
        .unwrap();
    assert_eq!(failed.result.value(), "ntpd is not running");
}

#[test]
fn nagios_plugins_use_nagios_codes() {
    let fixture = Fixture::new();
    let path = fixture.plugins.join("nagios/check_load.sh");
    script(&path, "#!/bin/sh\necho 'LOAD WARNING'\nexit 1\n");

    let outcome = fixture.engine().run(&fixture.target(), false).unwrap();
    let entry = outcome
        .results
        .get(&plugin_id(Path::new("nagios/check_load.sh")))
        .unwrap();

    assert_eq!(entry.plugin.backend, "nagios");
    assert_eq!(entry.status(), Status::Info);
    assert_eq!(entry.result.stderr.trim(), "LOAD WARNING");
}

#[test]
fn timed_out_plugin_is_skipped_by_hook() {
    let fixture = Fixture::new();
    script(&fixture.plugins.join("core/system/hang.sh"), "#!/bin/sh\nsleep 30\n");

    let engine = Engine::new(EngineConfig {
        plugin_roots: vec![fixture.plugins.clone()],
        timeout_secs: Some(1),
        ..Default::default()
    });
    let outcome = engine.run(&fixture.target(), false).unwrap();
    let entry = outcome
        .results
        .get(&fixture.id("hang"))
        .unwrap();

    assert_eq!(entry.status(), Status::Skipped);
    assert_eq!(entry.datahook.prior.len(), 1);
    assert!(entry.datahook.prior[0].result.killed);
    assert_eq!(entry.datahook.prior[0].result.status, Status::Error);
}

#[test]
fn aggregate_output_expands_and_stays_stable() {
    let fixture = Fixture::new();
    let path = fixture.plugins.join("core/faraday/positive/mtu.sh");
    script(&path, "#!/bin/sh\necho 'eth0:1500;eth1:9000' >&2\nexit $RC_OKAY\n");
    let parent = plugin_id(Path::new("core/faraday/positive/mtu.sh"));
    let engine = fixture.engine();

    let first = engine.run(&fixture.target(), false).unwrap();
    assert!(first.results.get(&parent).is_none());
    let children: Vec<_> = first
        .results
        .iter()
        .filter(|e| e.datahook.parent.as_deref() == Some(parent.as_str()))
        .collect();
    assert_eq!(children.len(), 2);
    assert!(children.iter().any(|e| e.result.stderr == "eth0:1500"));

    let second = engine.run(&fixture.target(), false).unwrap();
    assert!(second.executed.is_empty());
    assert_eq!(second.results.len(), first.results.len());
}

#[test]
fn live_runs_execute_everything_without_persisting() {
    let fixture = Fixture::new();
    let engine = fixture.engine();

    let first = engine.run(&Target::Live, false).unwrap();
    let second = engine.run(&Target::Live, false).unwrap();

    assert_eq!(first.executed.len(), 3);
    assert_eq!(second.executed.len(), 3);
    assert!(second.persisted.is_none());
}

#[test]
fn corrupt_document_runs_everything() {
    let fixture = Fixture::new();
    fs::write(fixture.snapshot.join("fleetcheck.json"), "{ not json").unwrap();

    let outcome = fixture.engine().run(&fixture.target(), false).unwrap();
    assert_eq!(outcome.executed.len(), 3);
    assert_eq!(fixture.document().results.len(), 3);
}

#[test]
fn missing_plugin_root_is_fatal() {
    let fixture = Fixture::new();
    let engine = Engine::new(EngineConfig {
        plugin_roots: vec![fixture.plugins.join("missing")],
        ..Default::default()
    });
    assert!(engine.run(&fixture.target(), false).is_err());
}

#[test]
fn hosts_with_different_install_prefixes_correlate() {
    let temp = TempDir::new().unwrap();
    let kernel = "#!/bin/sh\ncat \"$FLEETCHECK_ROOT/kernel\" >&2\nexit $RC_OKAY\n";
    let mut snapshots = Vec::new();

    for (host, version) in [("h1", "5.14"), ("h2", "4.18")] {
        let plugins = temp.path().join(format!("install-{}/plugins", host));
        script(&plugins.join("core/faraday/positive/kernel.sh"), kernel);
        let snapshot = temp.path().join(host);
        fs::create_dir_all(&snapshot).unwrap();
        fs::write(snapshot.join("kernel"), version).unwrap();

        let engine = Engine::new(EngineConfig {
            plugin_roots: vec![plugins],
            ..Default::default()
        });
        engine.run(&Target::Snapshot(snapshot.clone()), false).unwrap();
        snapshots.push(snapshot);
    }

    let report = Engine::default().correlate_paths(&snapshots, false).unwrap();
    let verdict = report
        .fleet
        .verdicts
        .iter()
        .find(|v| v.comparator == "positive-affinity")
        .unwrap();

    assert_eq!(verdict.status, Status::Failed);
    assert!(verdict.message.contains("kernel.sh"));
}

#[test]
fn profile_summary_is_rebuilt_on_reuse() {
    let fixture = Fixture::new();
    let profiles = fixture.plugins.parent().unwrap().join("profiles");
    fs::create_dir_all(&profiles).unwrap();
    fs::write(profiles.join("system.txt"), "# description: System basics\n+system\n-c.sh\n").unwrap();

    let engine = Engine::new(EngineConfig {
        plugin_roots: vec![fixture.plugins.clone()],
        profile_roots: vec![profiles],
        ..Default::default()
    });
    let profile_id = plugin_id(Path::new("system.txt"));

    let first = engine.run(&fixture.target(), false).unwrap();
    let summary = first.results.get(&profile_id).unwrap();
    assert_eq!(summary.status(), Status::Okay);
    assert!(summary.result.stderr.contains("a.sh"));
    assert!(!summary.result.stderr.contains("c.sh"));

    let second = engine.run(&fixture.target(), false).unwrap();
    assert!(second.executed.is_empty());
    assert!(second.pruned.is_empty());
    assert_eq!(second.results.get(&profile_id), Some(summary));
    assert!(fixture.document().results.contains_key(&profile_id));
}
