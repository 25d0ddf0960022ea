//! Plugin header metadata.
//!
//! Check units describe themselves with comment lines near the top of the
//! file:
//!
//! ```text
//! # long_name: Clock source
//! # description: Checks that a time source is configured
//! # priority: 400
//! # bugzilla: https://bugzilla.example.com/1234
//! # kb: https://kb.example.com/5678
//! ```
//!
//! Parsing never fails. Missing or malformed fields default to an empty
//! string, or priority 0.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::FleetcheckError;

/// Highest priority a unit can declare.
pub const MAX_PRIORITY: u32 = 999;

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*(description|long_name|priority|bugzilla|kb)\s*:\s*(.*?)\s*$").unwrap()
});

/// Descriptive metadata for a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// One-line description.
    #[serde(default)]
    pub description: String,

    /// Human readable name.
    #[serde(default)]
    pub long_name: String,

    /// Likelihood (0-999) that a failure of this check breaks the host.
    #[serde(default)]
    pub priority: u32,

    /// Related bug tracker URL.
    #[serde(default)]
    pub bugzilla: String,

    /// Related knowledge-base URL.
    #[serde(default)]
    pub kb: String,
}

/// Parse `# key: value` header lines.
///
/// The first occurrence of each key wins.
pub fn parse_header(content: &str) -> PluginMetadata {
    let mut metadata = PluginMetadata::default();
    let mut seen = [false; 5];

    for line in content.lines() {
        let Some(caps) = HEADER_REGEX.captures(line) else {
            continue;
        };
        let value = caps[2].to_string();
        let slot = match &caps[1] {
            "description" => 0,
            "long_name" => 1,
            "priority" => 2,
            "bugzilla" => 3,
            _ => 4,
        };
        if seen[slot] {
            continue;
        }
        seen[slot] = true;

        match slot {
            0 => metadata.description = value,
            1 => metadata.long_name = value,
            2 => metadata.priority = parse_priority(&value),
            3 => metadata.bugzilla = value,
            _ => metadata.kb = value,
        }
    }

    metadata
}

fn parse_priority(value: &str) -> u32 {
    match value.parse::<u32>() {
        Ok(priority) => priority.min(MAX_PRIORITY),
        Err(_) => {
            tracing::debug!("Ignoring non-numeric priority {:?}", value);
            0
        }
    }
}

/// Read and parse the header of a plugin file.
///
/// Unreadable files yield default metadata.
pub fn read_header(path: &Path) -> PluginMetadata {
    match fs::read(path) {
        Ok(bytes) => parse_header(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            let err = FleetcheckError::Metadata {
                path: path.to_path_buf(),
                message: e.to_string(),
            };
            tracing::warn!("{}", err);
            PluginMetadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = r#"#!/bin/bash
# long_name: Clock source
# description: Checks that a time source is configured
# priority: 400
# bugzilla: https://bugzilla.example.com/1234
# kb: https://kb.example.com/5678

exit $RC_OKAY
"#;

    #[test]
    fn parses_all_fields() {
        let meta = parse_header(HEADER);
        assert_eq!(meta.long_name, "Clock source");
        assert_eq!(meta.description, "Checks that a time source is configured");
        assert_eq!(meta.priority, 400);
        assert_eq!(meta.bugzilla, "https://bugzilla.example.com/1234");
        assert_eq!(meta.kb, "https://kb.example.com/5678");
    }

    #[test]
    fn missing_fields_default() {
        let meta = parse_header("#!/bin/sh\nexit 0\n");
        assert_eq!(meta, PluginMetadata::default());
    }

    #[test]
    fn malformed_priority_defaults_to_zero() {
        let meta = parse_header("# priority: high\n");
        assert_eq!(meta.priority, 0);
    }

    #[test]
    fn priority_is_clamped() {
        let meta = parse_header("# priority: 1000\n");
        assert_eq!(meta.priority, MAX_PRIORITY);
    }

    #[test]
    fn first_occurrence_wins() {
        let meta = parse_header("# description: first\n# description: second\n");
        assert_eq!(meta.description, "first");
    }

    #[test]
    fn read_header_of_missing_file_defaults() {
        let temp = TempDir::new().unwrap();
        let meta = read_header(&temp.path().join("missing.sh"));
        assert_eq!(meta, PluginMetadata::default());
    }

    #[test]
    fn read_header_tolerates_binary_content() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("bin");
        std::fs::write(&file, [0xff, 0xfe, b'\n', b'#', b' ', b'k', b'b', b':', b' ', b'x']).unwrap();
        assert_eq!(read_header(&file).kb, "x");
    }
}
