//! Canonical statuses and per-run exit code assignment.
//!
//! Units learn which exit code means what from their environment
//! (`RC_OKAY`, `RC_FAILED`, `RC_SKIPPED`, `RC_INFO`). The values are chosen
//! when a process first needs them and reused for the rest of the process,
//! so classification always goes through the assigned [`StatusCodes`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Classified outcome of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The check passed.
    Okay,
    /// The check found a problem.
    Failed,
    /// The check does not apply.
    Skipped,
    /// Informational output only.
    Info,
    /// The unit could not be classified (crash, signal, launch failure).
    Error,
}

impl Status {
    /// All statuses, in display order.
    pub const ALL: [Status; 5] = [
        Status::Okay,
        Status::Failed,
        Status::Skipped,
        Status::Info,
        Status::Error,
    ];

    /// Check if the status reports a problem worth showing by default.
    pub fn is_problem(&self) -> bool {
        matches!(self, Status::Failed | Status::Error)
    }

    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Okay => "okay",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
            Status::Info => "info",
            Status::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exit codes assigned to the four classifiable statuses for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCodes {
    pub okay: i32,
    pub failed: i32,
    pub skipped: i32,
    pub info: i32,
}

static PROCESS_CODES: OnceLock<StatusCodes> = OnceLock::new();

impl StatusCodes {
    /// Distance between consecutive codes.
    pub const SPACING: i32 = 10;

    /// Lowest base code. Keeps clear of shell and signal exit codes.
    pub const MIN_BASE: i32 = 10;

    /// Number of possible base codes.
    pub const BASE_RANGE: i32 = 80;

    /// Use an explicit mapping.
    pub fn fixed(okay: i32, failed: i32, skipped: i32, info: i32) -> Self {
        Self {
            okay,
            failed,
            skipped,
            info,
        }
    }

    /// Pick a fresh set of codes.
    ///
    /// The base is derived from the process id and current time, the four
    /// codes are `base`, `base + 10`, `base + 20`, `base + 30`.
    pub fn assign() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seed = format!("{}:{}", std::process::id(), nanos);
        let digest = Sha256::digest(seed.as_bytes());
        let offset = i32::from(u16::from_le_bytes([digest[0], digest[1]])) % Self::BASE_RANGE;
        Self::from_base(Self::MIN_BASE + offset)
    }

    /// Codes shared by every run in this process.
    pub fn process() -> Self {
        *PROCESS_CODES.get_or_init(|| {
            let codes = Self::assign();
            tracing::debug!("Assigned status codes {:?}", codes);
            codes
        })
    }

    fn from_base(base: i32) -> Self {
        Self {
            okay: base,
            failed: base + Self::SPACING,
            skipped: base + 2 * Self::SPACING,
            info: base + 3 * Self::SPACING,
        }
    }

    /// Classify an exit code against the assigned values.
    pub fn classify(&self, code: i32) -> Status {
        if code == self.okay {
            Status::Okay
        } else if code == self.failed {
            Status::Failed
        } else if code == self.skipped {
            Status::Skipped
        } else if code == self.info {
            Status::Info
        } else {
            Status::Error
        }
    }

    /// Exit code a unit should use to report `status`.
    pub fn code_for(&self, status: Status) -> Option<i32> {
        match status {
            Status::Okay => Some(self.okay),
            Status::Failed => Some(self.failed),
            Status::Skipped => Some(self.skipped),
            Status::Info => Some(self.info),
            Status::Error => None,
        }
    }

    /// Environment variables that expose the assignment to units.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("RC_OKAY".to_string(), self.okay.to_string()),
            ("RC_FAILED".to_string(), self.failed.to_string()),
            ("RC_SKIPPED".to_string(), self.skipped.to_string()),
            ("RC_INFO".to_string(), self.info.to_string()),
        ]
    }
}
