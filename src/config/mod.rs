//! Configuration loading and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use fleetcheck::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".fleetcheck.yml"), "priority: 400").unwrap();
//!
//! let config = load_config(None, temp.path()).unwrap();
//! assert_eq!(config.priority, 400);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{find_default_config, load_config, load_config_file, parse_config, DEFAULT_CONFIG_FILE};
pub use schema::{ConfigOverrides, EngineConfig};
pub use validator::{validate, validate_config};
