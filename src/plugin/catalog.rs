//! Plugin discovery.
//!
//! Walks each plugin root, lets the backend registry claim eligible files,
//! and builds a [`Plugin`] for each claimed file. The result is ordered by
//! path with duplicates collapsed, so `list` and `run` always agree.
//!
//! Identity comes from the path below the root, so two roots shipping the
//! same relative path describe the same plugin; the first root wins.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use super::{content_hash, plugin_id, Plugin, PluginFilter};
use crate::backend::BackendRegistry;
use crate::error::{FleetcheckError, Result};

/// Discover plugins below `roots`.
///
/// An unreadable root is fatal. Unreadable entries below a root are logged
/// and skipped.
pub fn discover(
    roots: &[PathBuf],
    registry: &BackendRegistry,
    filter: &PluginFilter,
) -> Result<Vec<Plugin>> {
    let mut found: BTreeMap<PathBuf, Plugin> = BTreeMap::new();
    let mut ids: BTreeSet<String> = BTreeSet::new();

    for root in roots {
        if fs::read_dir(root).is_err() {
            return Err(FleetcheckError::CatalogRootUnreadable { path: root.clone() });
        }

        tracing::debug!("Searching for plugins in {}", root.display());

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let err = FleetcheckError::Discovery {
                        path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                        message: e.to_string(),
                    };
                    tracing::warn!("{}", err);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if found.contains_key(path) {
                continue;
            }
            if !filter.admits_path(&path.to_string_lossy()) {
                continue;
            }

            let Some(adapter) = registry.claim(path) else {
                continue;
            };

            let hash = match content_hash(path) {
                Ok(h) => h,
                Err(e) => {
                    let err = FleetcheckError::Discovery {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    };
                    tracing::warn!("{}", err);
                    continue;
                }
            };

            let relative = path.strip_prefix(root).unwrap_or(path);
            let id = plugin_id(relative);
            if ids.contains(&id) {
                tracing::debug!("{} shadowed by an earlier root", path.display());
                continue;
            }
            let (category, subcategory, name) = plugin_naming(relative, adapter.name());

            let plugin = Plugin {
                id,
                path: path.to_path_buf(),
                backend: adapter.name().to_string(),
                category,
                subcategory,
                name,
                content_hash: hash,
                metadata: adapter.metadata(path),
            };

            if !filter.admits(&plugin) {
                continue;
            }

            ids.insert(plugin.id.clone());
            found.insert(plugin.path.clone(), plugin);
        }
    }

    tracing::debug!("Found {} plugins", found.len());
    Ok(found.into_values().collect())
}

/// Split a root-relative path into `(category, subcategory, name)`.
///
/// A leading directory named after the backend is not a category.
pub fn plugin_naming(relative: &Path, backend: &str) -> (String, String, String) {
    let name = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut dirs: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if dirs.first().is_some_and(|d| d == backend) {
        dirs.remove(0);
    }

    let category = if dirs.is_empty() {
        String::new()
    } else {
        dirs.remove(0)
    };

    (category, dirs.join("/"), name)
}
