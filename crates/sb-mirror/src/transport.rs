// transport.rs — Tree movement across the host/container boundary.
//
// Both directions are gated on a liveness probe with no side effects on
// failure. copy_in clears the container workspace before transferring so
// the mirror is a replacement, not a merge.

use std::path::Path;
use std::time::Duration;

use sb_backend::{Backend, ExecResult, Service};

use crate::error::MirrorError;

// Clearing globs both visible and hidden entries. The hidden-entry glob
// exits 1 when the directory has no dotfiles — that is success.
const CLEAR_WORKSPACE_CMD: &str = "rm -rf /workspace/* /workspace/.[!.]* 2>/dev/null";
const CLEAR_TIMEOUT: Duration = Duration::from_secs(60);

/// Copies workspace trees into and out of a shadow's container.
pub struct MirrorTransport<'a> {
    backend: &'a dyn Backend,
}

impl<'a> MirrorTransport<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Replace the container workspace with the host tree at `host_path`.
    pub fn copy_in(&self, shadow: &str, host_path: &Path) -> Result<ExecResult, MirrorError> {
        if !self.backend.is_running(shadow) {
            return Err(MirrorError::NotRunning(shadow.to_string()));
        }

        let cleared =
            self.backend
                .exec(shadow, Service::Workspace, CLEAR_WORKSPACE_CMD, CLEAR_TIMEOUT)?;
        if cleared.status_code != 0 && cleared.status_code != 1 {
            return Err(MirrorError::Transfer(cleared));
        }

        let copied = self.backend.copy_in(shadow, host_path)?;
        if !copied.success() {
            return Err(MirrorError::Transfer(copied));
        }

        tracing::info!(shadow, host = %host_path.display(), "mirrored workspace in");
        Ok(ExecResult::ok(format!(
            "copied {} into shadow workspace",
            host_path.display()
        )))
    }

    /// Copy the container workspace tree out to `dest` on the host.
    ///
    /// `dest` may be scratch space (diff) or the host workspace itself
    /// (promote); the transport does not care.
    pub fn copy_out(&self, shadow: &str, dest: &Path) -> Result<ExecResult, MirrorError> {
        if !self.backend.is_running(shadow) {
            return Err(MirrorError::NotRunning(shadow.to_string()));
        }

        let copied = self.backend.copy_out(shadow, dest)?;
        if !copied.success() {
            return Err(MirrorError::Transfer(copied));
        }

        tracing::debug!(shadow, dest = %dest.display(), "mirrored workspace out");
        Ok(ExecResult::ok(format!(
            "copied shadow workspace to {}",
            dest.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn copy_in_requires_running_context() {
        let backend = FakeBackend::new();
        backend.set_running(false);
        let host = tempdir().unwrap();

        let err = MirrorTransport::new(&backend)
            .copy_in("demo", host.path())
            .unwrap_err();
        assert!(matches!(err, MirrorError::NotRunning(_)));
        // No side effects: the fake's workspace was never touched.
        assert!(backend.workspace_files().is_empty());
    }

    #[test]
    fn copy_in_replaces_container_workspace() {
        let backend = FakeBackend::new();
        backend.write_workspace_file("stale.txt", "old generation");

        let host = tempdir().unwrap();
        fs::write(host.path().join("fresh.txt"), "new").unwrap();

        let result = MirrorTransport::new(&backend)
            .copy_in("demo", host.path())
            .unwrap();
        assert!(result.success());

        let files = backend.workspace_files();
        assert_eq!(files, vec!["fresh.txt".to_string()]);
    }

    #[test]
    fn copy_out_lands_in_destination() {
        let backend = FakeBackend::new();
        backend.write_workspace_file("produced.txt", "output");

        let dest = tempdir().unwrap();
        MirrorTransport::new(&backend)
            .copy_out("demo", dest.path())
            .unwrap();

        assert_eq!(
            fs::read_to_string(dest.path().join("produced.txt")).unwrap(),
            "output"
        );
    }

    #[test]
    fn copy_out_not_running_fails_cleanly() {
        let backend = FakeBackend::new();
        backend.set_running(false);
        let dest = tempdir().unwrap();

        let err = MirrorTransport::new(&backend)
            .copy_out("demo", dest.path())
            .unwrap_err();
        assert!(matches!(err, MirrorError::NotRunning(_)));
    }
}
