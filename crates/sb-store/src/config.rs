// config.rs — Per-shadow configuration records.
//
// One JSON file per shadow name. Diff and promote run in a different
// process invocation than activation, so the original workspace path
// must be recoverable from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Persisted configuration for one shadow environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Absolute path of the host workspace mirrored into the shadow.
    pub workspace_path: PathBuf,

    /// Host port the forge is published on.
    pub forge_port: u16,
}

/// File-backed store of [`ShadowConfig`] records, one per shadow name.
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Create a store backed by the given directory (created if absent).
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::io(&dir, source))?;
        Ok(Self { dir })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Persist a config record, overwriting any previous one.
    pub fn put(&self, name: &str, config: &ShadowConfig) -> Result<(), StoreError> {
        let path = self.record_path(name);
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&path, json).map_err(|source| StoreError::io(&path, source))?;
        tracing::debug!(shadow = name, "saved shadow config");
        Ok(())
    }

    /// Load the config record for a shadow, if one exists.
    pub fn get(&self, name: &str) -> Result<Option<ShadowConfig>, StoreError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| StoreError::io(&path, source))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.record_path(name).exists()
    }

    /// Delete a config record. Returns whether one existed.
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| StoreError::io(&path, source))?;
        Ok(true)
    }

    /// All shadow names with a saved config (used for orphan detection).
    pub fn known_shadows(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::io(&self.dir, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::io(&self.dir, source))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
