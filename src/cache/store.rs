//! Per-root results document on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FleetcheckError, Result};
use crate::results::{ResultDocument, ResultSet, RunMetadata};

/// Location of one persisted results document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    /// Store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside a snapshot directory.
    pub fn for_snapshot(root: &Path, results_file: &str) -> Self {
        Self::at(root.join(results_file))
    }

    /// Resolve a directory to its results file; any other path is used as is.
    pub fn locate(path: &Path, results_file: &str) -> Self {
        if path.is_dir() {
            Self::for_snapshot(path, results_file)
        } else {
            Self::at(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the stored document, `None` if there is none yet.
    pub fn load_document(&self) -> Result<Option<ResultDocument>> {
        if !self.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        let doc = serde_json::from_str(&content).map_err(|e| self.error(e))?;
        Ok(Some(doc))
    }

    /// Load the stored result set, `None` if there is none yet.
    pub fn load(&self) -> Result<Option<ResultSet>> {
        Ok(self.load_document()?.map(ResultDocument::into_set))
    }

    /// Write the document atomically.
    pub fn save(&self, set: &ResultSet, metadata: RunMetadata) -> Result<()> {
        let doc = ResultDocument::new(metadata, set);
        self.write_json(&doc)
    }

    /// Write any serializable value atomically to this store's path.
    pub fn write_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.error(e))?;
        }
        let content = serde_json::to_string_pretty(value).map_err(|e| self.error(e))?;

        // Write to a sibling temp file, then rename over the target
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|e| self.error(e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| self.error(e))?;

        tracing::debug!("Saved results to {}", self.path.display());
        Ok(())
    }

    fn error(&self, e: impl std::fmt::Display) -> FleetcheckError {
        FleetcheckError::Persistence {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}
