//! Result entries and their hook audit trail.

use serde::{Deserialize, Serialize};

use crate::exec::{RawExit, RawResult, Status};
use crate::plugin::Plugin;

const SIGKILL: i32 = 9;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Backend name of entries summarizing other entries (profiles).
pub const SUMMARY_BACKEND: &str = "profile";

/// Classified outcome of one unit execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(rename = "rc")]
    pub status: Status,

    #[serde(rename = "out", default)]
    pub stdout: String,

    #[serde(rename = "err", default)]
    pub stderr: String,

    /// Wall-clock seconds. Persisted on the entry, not here.
    #[serde(skip)]
    pub elapsed: f64,

    /// Set when the unit was killed (timeout or `SIGKILL`).
    #[serde(default, skip_serializing_if = "is_false")]
    pub killed: bool,
}

impl ExecutionResult {
    pub fn new(status: Status, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
            elapsed: 0.0,
            killed: false,
        }
    }

    /// An `ERROR` result carrying a diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, String::new(), message)
    }

    /// Classify a raw outcome. `classify` maps exit codes to statuses.
    pub fn from_raw(raw: RawResult, classify: impl Fn(i32) -> Status) -> Self {
        let RawResult {
            exit,
            stdout,
            mut stderr,
        } = raw;

        let mut killed = false;
        let status = match exit {
            RawExit::Code(code) => {
                let status = classify(code);
                if status == Status::Error {
                    append_line(&mut stderr, &format!("unexpected exit code {}", code));
                }
                status
            }
            RawExit::Signal(signal) => {
                killed = signal == SIGKILL;
                append_line(&mut stderr, &format!("terminated by signal {}", signal));
                Status::Error
            }
            RawExit::TimedOut => {
                killed = true;
                append_line(&mut stderr, "killed after exceeding the timeout");
                Status::Error
            }
            RawExit::Unknown => {
                append_line(&mut stderr, "exit status unavailable");
                Status::Error
            }
            RawExit::Decided(status) => status,
        };

        Self {
            status,
            stdout,
            stderr,
            elapsed: 0.0,
            killed,
        }
    }

    /// Text used when comparing hosts: trimmed stderr, else trimmed stdout.
    pub fn value(&self) -> &str {
        let err = self.stderr.trim();
        if err.is_empty() {
            self.stdout.trim()
        } else {
            err
        }
    }
}

fn append_line(buf: &mut String, line: &str) {
    if !buf.is_empty() && !buf.ends_with('\n') {
        buf.push('\n');
    }
    buf.push_str(line);
}

/// A result replaced by a hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorResult {
    pub hook: String,
    pub result: ExecutionResult,
}

/// Audit trail kept by hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datahook {
    /// Results overwritten by hooks, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prior: Vec<PriorResult>,

    /// Id of the entry this one was synthesized from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Datahook {
    pub fn is_empty(&self) -> bool {
        self.prior.is_empty() && self.parent.is_none()
    }
}

/// A plugin with its latest result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub plugin: Plugin,
    pub result: ExecutionResult,
    pub datahook: Datahook,
}

impl ResultEntry {
    pub fn new(plugin: Plugin, result: ExecutionResult) -> Self {
        Self {
            plugin,
            result,
            datahook: Datahook::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.plugin.id
    }

    pub fn status(&self) -> Status {
        self.result.status
    }

    /// Id of the discovered plugin this entry belongs to.
    pub fn owner_id(&self) -> &str {
        self.datahook.parent.as_deref().unwrap_or(&self.plugin.id)
    }

    pub fn is_synthetic(&self) -> bool {
        self.datahook.parent.is_some()
    }

    /// Whether a hook built this entry from other entries' results.
    pub fn is_summary(&self) -> bool {
        self.plugin.backend == SUMMARY_BACKEND
    }

    /// Replace the result, recording the old one under `hook`.
    pub fn overwrite(&mut self, hook: &str, result: ExecutionResult) {
        let prior = std::mem::replace(&mut self.result, result);
        self.result.elapsed = prior.elapsed;
        self.datahook.prior.push(PriorResult {
            hook: hook.to_string(),
            result: prior,
        });
    }

    /// Latest result recorded by `hook`, if it is the most recent override.
    pub fn last_override_by(&self, hook: &str) -> Option<&ExecutionResult> {
        self.datahook
            .prior
            .last()
            .filter(|p| p.hook == hook)
            .map(|p| &p.result)
    }

    /// Undo the most recent override made by `hook`.
    pub fn restore(&mut self, hook: &str) -> bool {
        if self.last_override_by(hook).is_none() {
            return false;
        }
        if let Some(prior) = self.datahook.prior.pop() {
            let elapsed = self.result.elapsed;
            self.result = prior.result;
            self.result.elapsed = elapsed;
            return true;
        }
        false
    }
}
