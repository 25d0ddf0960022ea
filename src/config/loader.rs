//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use super::schema::EngineConfig;
use super::validator::validate;
use crate::error::{FleetcheckError, Result};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".fleetcheck.yml";

/// Default config path below `dir`, if the file exists.
pub fn find_default_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one, `.fleetcheck.yml` in `dir` is
/// used when present, defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<EngineConfig> {
    let config = match explicit {
        Some(path) => load_config_file(path)?,
        None => match find_default_config(dir) {
            Some(path) => load_config_file(&path)?,
            None => {
                tracing::debug!("No config file, using defaults");
                EngineConfig::default()
            }
        },
    };
    validate(&config)?;
    Ok(config)
}

/// Load a single config file.
pub fn load_config_file(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FleetcheckError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            FleetcheckError::Io(e)
        }
    })?;

    tracing::debug!("Loaded config from {}", path.display());
    parse_config(&content, path)
}

/// Parse YAML content into an [`EngineConfig`].
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<EngineConfig> {
    if content.trim().is_empty() {
        return Ok(EngineConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| FleetcheckError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}
