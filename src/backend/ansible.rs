//! Ansible playbook units.
//!
//! Playbooks are run against localhost with `ansible-playbook`. Whether a
//! playbook applies is decided from its text: snapshot runs need playbooks
//! that read `FLEETCHECK_ROOT`, live runs take playbooks that either do not
//! read it or declare `FLEETCHECK_HYBRID`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;

use super::{has_component, Adapter};
use crate::error::Result;
use crate::exec::{run_process, which, Invocation, RawResult, RunContext, Status, StatusCodes};
use crate::plugin::{parse_header, Plugin, PluginMetadata};

static ROOT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FLEETCHECK_ROOT").unwrap());
static HYBRID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FLEETCHECK_HYBRID").unwrap());

const PLAYBOOK_BINARY: &str = "ansible-playbook";

pub struct AnsibleAdapter {
    binary: Option<PathBuf>,
}

impl AnsibleAdapter {
    /// Adapter using `ansible-playbook` from `PATH`, if installed.
    pub fn new() -> Self {
        Self {
            binary: which(PLAYBOOK_BINARY),
        }
    }

    /// Adapter using an explicit binary, or none.
    pub fn with_binary(binary: Option<PathBuf>) -> Self {
        Self { binary }
    }
}

impl Default for AnsibleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for AnsibleAdapter {
    fn name(&self) -> &'static str {
        "ansible"
    }

    fn matches(&self, path: &Path) -> bool {
        has_component(path, "ansible")
            && path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml")
    }

    fn metadata(&self, path: &Path) -> PluginMetadata {
        let text = match read_playbook(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("{:#}", e);
                return PluginMetadata::default();
            }
        };
        let mut metadata = parse_header(&text);
        if let Some(description) = playbook_description(&text) {
            metadata.description = description;
        }
        metadata
    }

    fn run(&self, plugin: &Plugin, ctx: &RunContext) -> Result<RawResult> {
        let Some(binary) = &self.binary else {
            return Ok(RawResult::decided(
                Status::Skipped,
                "",
                "ansible-playbook support not found",
            ));
        };

        let text = read_playbook(&plugin.path)?;
        if !applies(&text, ctx.target.is_live()) {
            return Ok(RawResult::decided(
                Status::Skipped,
                "",
                "Plugin does not satisfy conditions for running",
            ));
        }

        let mut invocation = Invocation::for_plugin(plugin, ctx);
        invocation
            .env
            .push(("ANSIBLE_RETRY_FILES_ENABLED".to_string(), "0".to_string()));

        let args = [
            "-i".to_string(),
            "localhost,".to_string(),
            "--connection=local".to_string(),
            plugin.path_str(),
        ];
        let raw = run_process(binary, &args, &invocation)?;

        Ok(RawResult {
            exit: raw.exit,
            stdout: String::new(),
            stderr: failure_section(&raw.stdout),
        })
    }

    fn classify(&self, code: i32, _codes: &StatusCodes) -> Status {
        match code {
            0 => Status::Okay,
            2 => Status::Failed,
            _ => Status::Error,
        }
    }
}

fn read_playbook(path: &Path) -> anyhow::Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Cannot read playbook {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Whether a playbook should run in the given mode.
fn applies(text: &str, live: bool) -> bool {
    let reads_root = ROOT_REGEX.is_match(text);
    if live {
        HYBRID_REGEX.is_match(text) || !reads_root
    } else {
        reads_root
    }
}

/// `[0].vars.metadata.description` of the playbook, if present.
fn playbook_description(text: &str) -> Option<String> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text).ok()?;
    doc.get(0)?
        .get("vars")?
        .get("metadata")?
        .get("description")?
        .as_str()
        .map(str::to_string)
}

/// Keep only the text between `FAILED!` and the play recap, when present.
fn failure_section(output: &str) -> String {
    let Some(start) = output.find("FAILED!") else {
        return output.to_string();
    };
    let rest = &output[start + "FAILED!".len()..];
    let rest = rest.trim_start_matches(&[' ', '=', '>'][..]);
    let end = rest.find("PLAY RECAP").unwrap_or(rest.len());
    rest[..end].trim().to_string()
}
