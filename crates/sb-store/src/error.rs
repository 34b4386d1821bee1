// error.rs — Error types for the state stores.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize a config record.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No home directory could be resolved for the default state root.
    #[error("cannot determine home directory for the state root")]
    NoHomeDir,
}

impl StoreError {
    /// Shorthand for wrapping an I/O error with its path.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
