// snapshot.rs — Baseline workspace snapshots, one tree per shadow.
//
// A snapshot is the exclusion-filtered copy of the host workspace taken
// at activation time; the diff engine later compares the mirrored tree
// against it. Capture is destructive-then-recreate: one shadow carries
// one logical generation at a time, so re-activating replaces the
// previous baseline outright.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::exclude::ExcludeRules;
use crate::fsutil::copy_tree_filtered;

/// File-backed store of workspace snapshot trees, one per shadow name.
pub struct SnapshotStore {
    dir: PathBuf,
    rules: ExcludeRules,
}

impl SnapshotStore {
    /// Create a store backed by the given directory (created if absent).
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::io(&dir, source))?;
        Ok(Self {
            dir,
            rules: ExcludeRules::standard(),
        })
    }

    /// The exclusion filter this store captures with. The diff engine
    /// must apply the same rules or tool artifacts appear as divergence.
    pub fn rules(&self) -> &ExcludeRules {
        &self.rules
    }

    /// Location of the snapshot tree for a shadow.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_dir()
    }

    /// Capture a filtered copy of `workspace` as the baseline for `name`.
    ///
    /// Replaces any prior snapshot. The copy lands in a temporary
    /// sibling directory and is renamed into place only when complete,
    /// so a failed capture never leaves a tree `exists()` would report
    /// as a valid baseline.
    pub fn capture(&self, workspace: &Path, name: &str) -> Result<(), StoreError> {
        let final_dir = self.path(name);
        let tmp_dir = self.dir.join(format!(".tmp-{name}"));

        if tmp_dir.exists() {
            fs::remove_dir_all(&tmp_dir).map_err(|source| StoreError::io(&tmp_dir, source))?;
        }
        fs::create_dir_all(&tmp_dir).map_err(|source| StoreError::io(&tmp_dir, source))?;

        if let Err(err) = copy_tree_filtered(workspace, &tmp_dir, &self.rules) {
            let _ = fs::remove_dir_all(&tmp_dir);
            return Err(err);
        }

        if final_dir.exists() {
            fs::remove_dir_all(&final_dir).map_err(|source| StoreError::io(&final_dir, source))?;
        }
        fs::rename(&tmp_dir, &final_dir).map_err(|source| StoreError::io(&final_dir, source))?;

        tracing::info!(shadow = name, workspace = %workspace.display(), "captured snapshot");
        Ok(())
    }

    /// Discard the snapshot for a shadow. Returns whether one existed.
    pub fn discard(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&path).map_err(|source| StoreError::io(&path, source))?;
        tracing::info!(shadow = name, "discarded snapshot");
        Ok(true)
    }

    /// All shadow names with a snapshot (used for orphan detection).
    /// In-progress temp directories are not listed.
    pub fn known_shadows(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::io(&self.dir, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::io(&self.dir, source))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_dir() && !name.starts_with(".tmp-") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
