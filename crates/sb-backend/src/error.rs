// error.rs — Error types for the execution backend.

use thiserror::Error;

/// Errors that can occur talking to the execution backend.
///
/// A command that *ran* and exited non-zero is not an error — that is
/// an [`ExecResult`](crate::ExecResult) with a failing status. These
/// variants cover the cases where the backend tooling itself could not
/// be invoked.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend binary could not be spawned (docker missing, no
    /// permission, etc.). Output that is not valid UTF-8 is converted
    /// lossily rather than rejected — diagnostics stay best-effort.
    #[error("failed to invoke backend command: {0}")]
    Io(#[from] std::io::Error),
}
