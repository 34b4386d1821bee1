// error.rs — Error taxonomy for the mirroring subsystem.

use std::path::PathBuf;

use sb_backend::{BackendError, ExecResult};
use sb_store::StoreError;
use thiserror::Error;

/// Errors that can occur during mirror, diff, and promote operations.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The shadow's execution context is not running. Checked before
    /// any side effect, never silently bypassed.
    #[error("shadow '{0}' is not running; start it first")]
    NotRunning(String),

    /// No snapshot baseline exists for this shadow — a usage-order
    /// violation (activate before diff/promote), not a transfer fault.
    #[error("no snapshot for shadow '{0}'; was it activated with a workspace copy?")]
    NoBaseline(String),

    /// A backend copy/exec ran and reported failure. The captured
    /// diagnostics are surfaced verbatim and never retried.
    #[error("transfer failed (exit {code}): {stderr}", code = .0.status_code, stderr = .0.stderr)]
    Transfer(ExecResult),

    /// The backend tooling itself could not be invoked.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A snapshot store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Local file I/O failed (scratch space, workspace clearing).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MirrorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
