// credential.rs — Bearer-token storage, one file per shadow.
//
// Tokens authenticate against the shadow's forge API. They live under
// the state root (never inside a workspace) with owner-only permissions.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// File-backed store of forge bearer tokens, one per shadow name.
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Create a store backed by the given directory (created if absent).
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::io(&dir, source))?;
        Ok(Self { dir })
    }

    /// Path of the token file for a shadow (used in remediation hints).
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Persist a token with restrictive permissions (0600 on unix).
    pub fn put(&self, name: &str, token: &str) -> Result<(), StoreError> {
        let path = self.path(name);
        fs::write(&path, format!("{token}\n")).map_err(|source| StoreError::io(&path, source))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).map_err(|source| StoreError::io(&path, source))?;
        }

        tracing::debug!(shadow = name, "saved forge token");
        Ok(())
    }

    /// Load the token for a shadow, if one exists.
    pub fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::io(&path, source))?;
        Ok(Some(raw.trim().to_string()))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Delete the token for a shadow. Returns whether one existed.
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| StoreError::io(&path, source))?;
        Ok(true)
    }

    /// All shadow names with a stored token (used for orphan detection).
    pub fn known_shadows(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::io(&self.dir, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::io(&self.dir, source))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
