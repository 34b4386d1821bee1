// result.rs — ExecResult, the uniform outcome of every backend operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status code reported when an operation exceeded its deadline.
///
/// Distinguishable from any real process exit code, which is >= 0 on
/// every platform we target.
pub const TIMEOUT_STATUS: i32 = -1;

/// Result of executing a command against the execution backend.
///
/// Failures are values, not panics: a non-zero status with captured
/// diagnostics propagates up to the caller verbatim, which decides
/// whether to surface, classify, or tolerate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    /// Process exit status; `-1` means the operation timed out.
    pub status_code: i32,

    /// Captured standard output.
    pub stdout: String,

    /// Captured standard error.
    pub stderr: String,
}

impl ExecResult {
    /// A successful result carrying a message on stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed result (status 1) carrying diagnostics on stderr.
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            status_code: 1,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// The result of an operation that exceeded its deadline.
    ///
    /// `stdout` holds whatever output was captured before the kill.
    pub fn timed_out(timeout: Duration, partial_stdout: String) -> Self {
        Self {
            status_code: TIMEOUT_STATUS,
            stdout: partial_stdout,
            stderr: format!("timed out after {}s", timeout.as_secs()),
        }
    }

    /// `true` iff the operation exited with status 0.
    pub fn success(&self) -> bool {
        self.status_code == 0
    }

    /// `true` iff the operation was killed for exceeding its deadline.
    pub fn is_timeout(&self) -> bool {
        self.status_code == TIMEOUT_STATUS
    }
}
