//! # sb-backend
//!
//! Execution backend abstraction for Shadowbox.
//!
//! Every shadow environment is backed by an isolated execution context
//! (a docker-compose project in the real implementation). This crate
//! defines the narrow capability surface the rest of the system needs:
//!
//! - [`ExecResult`] — uniform result value for every backend operation.
//! - [`Backend`] — trait with start/stop/exec/copy/probe/logs. The one
//!   real implementation is [`ComposeBackend`]; tests substitute fakes.
//!
//! The trait keeps data movement and command execution behind a seam so
//! the mirroring subsystem never shells out directly.

pub mod compose;
pub mod error;
mod process;
pub mod result;

pub use compose::ComposeBackend;
pub use error::BackendError;
pub use result::ExecResult;

use std::path::Path;
use std::time::Duration;

/// Options for starting a shadow's execution context.
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Host directory mirrored into the container workspace.
    pub workspace_dir: std::path::PathBuf,

    /// Host port the forge (artifact host) is published on.
    pub forge_port: u16,
}

/// A service inside a shadow's execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// The workspace container where commands run against the mirror.
    Workspace,
    /// The forge container serving module repositories.
    Forge,
}

impl Service {
    /// Compose service name.
    pub fn name(self) -> &'static str {
        match self {
            Service::Workspace => "workspace",
            Service::Forge => "forge",
        }
    }
}

/// Capability interface to the execution backend.
///
/// Implemented once against docker-compose ([`ComposeBackend`]) and
/// trivially fakeable in tests. All operations are synchronous; `exec`
/// carries an explicit timeout and reports expiry with status `-1`
/// rather than blocking indefinitely.
pub trait Backend: Send + Sync {
    /// Start the execution context for a shadow. Idempotent at the
    /// compose level (re-running `up` on a running project is a no-op).
    fn start(&self, shadow: &str, opts: &StartOptions) -> Result<ExecResult, BackendError>;

    /// Stop the execution context. `purge_data` also removes the
    /// backend's data volumes.
    fn stop(&self, shadow: &str, purge_data: bool) -> Result<ExecResult, BackendError>;

    /// Execute a shell command inside one of the shadow's services.
    fn exec(
        &self,
        shadow: &str,
        service: Service,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, BackendError>;

    /// Copy the host tree at `host_path` into the container workspace.
    fn copy_in(&self, shadow: &str, host_path: &Path) -> Result<ExecResult, BackendError>;

    /// Copy the container workspace tree out to `dest` on the host.
    fn copy_out(&self, shadow: &str, dest: &Path) -> Result<ExecResult, BackendError>;

    /// Liveness probe: is the shadow's execution context running?
    fn is_running(&self, shadow: &str) -> bool;

    /// Fetch the last `tail` log lines from a service.
    fn logs(&self, shadow: &str, service: Service, tail: u32) -> Result<ExecResult, BackendError>;
}
