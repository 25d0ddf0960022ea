//! Plugin catalog.
//!
//! A plugin is one independently executable check unit found below a
//! configured plugin root. This module provides:
//!
//! - [`Plugin`] and [`PluginMetadata`], rebuilt fresh on every discovery
//! - [`calc_id`] / [`plugin_id`] for stable, path-derived identity
//! - [`content_hash`] for change detection
//! - [`parse_header`] for `# key: value` header comments
//! - [`discover`] and [`PluginFilter`] for walking and filtering roots

pub mod catalog;
pub mod filter;
pub mod id;
pub mod metadata;

pub use catalog::{discover, plugin_naming};
pub use filter::PluginFilter;
pub use id::{calc_id, content_hash, plugin_id, synthetic_id};
pub use metadata::{parse_header, read_header, PluginMetadata, MAX_PRIORITY};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered check unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Identity derived from the plugin path.
    pub id: String,

    /// Path of the unit on disk.
    pub path: PathBuf,

    /// Name of the backend adapter that owns this unit.
    pub backend: String,

    /// First directory below the root (after the backend directory).
    pub category: String,

    /// Remaining directories, joined with `/`.
    pub subcategory: String,

    /// File stem of the unit.
    pub name: String,

    /// Digest of the file bytes.
    pub content_hash: String,

    /// Header metadata.
    pub metadata: PluginMetadata,
}

impl Plugin {
    /// Path as a string, used for substring filters and comparator selection.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Directory containing the unit.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Check whether this unit's path contains the given fragment.
    pub fn path_contains(&self, fragment: &str) -> bool {
        self.path_str().contains(fragment)
    }
}
