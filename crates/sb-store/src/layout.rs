// layout.rs — State directory layout.
//
// StateLayout computes the three parallel state directories under one
// root. The root lives in the user's home directory by default, outside
// any workspace, so snapshots can never recursively include themselves.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Name of the state directory (and the pattern excluded from
/// snapshots/diffs in case a custom root nests inside a workspace).
pub const STATE_DIR_NAME: &str = ".shadowbox";

/// Locations of all persisted Shadowbox state.
#[derive(Debug, Clone)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    /// A layout rooted at an explicit directory (tests, custom roots).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The standard layout under the user's home directory.
    pub fn default_home() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(Self::new(home.join(STATE_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-shadow JSON config records.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Per-shadow bearer-token files.
    pub fn tokens_dir(&self) -> PathBuf {
        self.root.join("tokens")
    }

    /// Per-shadow workspace snapshot trees.
    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join("snapshots")
    }
}
