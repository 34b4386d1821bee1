// error.rs — Error types for the gateway.

use sb_backend::{BackendError, ExecResult};
use sb_mirror::MirrorError;
use sb_resolve::ResolveError;
use sb_store::StoreError;
use thiserror::Error;

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The shadow's execution context is not running.
    #[error("shadow '{0}' is not running; start it first")]
    NotRunning(String),

    /// No saved config record for this shadow — it was never activated
    /// (or its state was purged).
    #[error("no saved config for shadow '{0}'; activate it first")]
    NoConfig(String),

    /// A backend operation ran and reported failure.
    #[error("{op} failed (exit {code}): {stderr}", code = .result.status_code, stderr = .result.stderr)]
    OperationFailed {
        op: &'static str,
        result: ExecResult,
    },

    /// The forge rejected our credential. Carries remediation: the
    /// stale token must be re-issued.
    #[error("forge rejected the API token (HTTP 401)\nfix: delete {token_path} and re-run `sbx init {shadow}`")]
    AuthFailure { shadow: String, token_path: String },

    /// The forge returned an unexpected status.
    #[error("forge API error: HTTP {status} - {body}")]
    Forge { status: u16, body: String },

    /// The forge did not become ready before the deadline.
    #[error("forge did not become ready within {0}s")]
    NotReady(u64),

    /// A git operation in a module directory failed.
    #[error("git error: {0}")]
    Git(String),

    /// HTTP transport failure talking to the forge.
    #[error("forge request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock record or config payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
