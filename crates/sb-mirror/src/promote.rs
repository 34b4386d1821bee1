// promote.rs — One-directional reconciliation back to the host.
//
// Promote overwrites the host workspace with the mirrored tree: every
// entry except version-control metadata is removed, the container tree
// is copied out in its place, and the snapshot is discarded — the
// generation is consumed, so a later diff against the old baseline
// would be meaningless.
//
// A failure mid-copy leaves the workspace partially cleared. That risk
// is documented and mitigated by the calling layer (diff before
// promote), not by this engine.

use std::fs;
use std::path::Path;

use sb_backend::{Backend, ExecResult};
use sb_store::SnapshotStore;

use crate::error::MirrorError;
use crate::transport::MirrorTransport;

/// Directory names whose repository history/identity must survive a
/// promotion.
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Overwrites the host workspace with the mirrored tree.
pub struct PromoteEngine<'a> {
    backend: &'a dyn Backend,
    snapshots: &'a SnapshotStore,
}

impl<'a> PromoteEngine<'a> {
    pub fn new(backend: &'a dyn Backend, snapshots: &'a SnapshotStore) -> Self {
        Self { backend, snapshots }
    }

    /// Promote the mirror of `shadow` into `workspace`.
    ///
    /// Preconditions are checked before anything is deleted: a failure
    /// on either leaves the workspace untouched.
    pub fn promote(&self, shadow: &str, workspace: &Path) -> Result<ExecResult, MirrorError> {
        if !self.backend.is_running(shadow) {
            return Err(MirrorError::NotRunning(shadow.to_string()));
        }
        if !self.snapshots.exists(shadow) {
            return Err(MirrorError::NoBaseline(shadow.to_string()));
        }

        clear_except_vcs(workspace)?;
        MirrorTransport::new(self.backend).copy_out(shadow, workspace)?;
        self.snapshots.discard(shadow)?;

        tracing::info!(shadow, workspace = %workspace.display(), "promoted shadow changes");
        Ok(ExecResult::ok(format!(
            "promoted shadow changes to {}",
            workspace.display()
        )))
    }
}

/// Remove every workspace entry except version-control metadata.
fn clear_except_vcs(workspace: &Path) -> Result<(), MirrorError> {
    let entries =
        fs::read_dir(workspace).map_err(|source| MirrorError::io(workspace, source))?;

    for entry in entries {
        let entry = entry.map_err(|source| MirrorError::io(workspace, source))?;
        let name = entry.file_name();
        if VCS_DIRS.contains(&name.to_string_lossy().as_ref()) {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|source| MirrorError::io(&path, source))?;
        } else {
            fs::remove_file(&path).map_err(|source| MirrorError::io(&path, source))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffEngine;
    use crate::fake::FakeBackend;
    use tempfile::tempdir;

    fn host_workspace() -> tempfile::TempDir {
        let ws = tempdir().unwrap();
        fs::write(ws.path().join("original.txt"), "host version").unwrap();
        fs::create_dir_all(ws.path().join(".git")).unwrap();
        fs::write(ws.path().join(".git/HEAD"), "ref: main").unwrap();
        ws
    }

    #[test]
    fn promote_overwrites_host_and_keeps_vcs() {
        let state = tempdir().unwrap();
        let snapshots = SnapshotStore::new(state.path().join("snapshots")).unwrap();
        let host = host_workspace();

        let backend = FakeBackend::new();
        backend.write_workspace_file("shadow.txt", "mirror output");
        snapshots.capture(&backend.workspace(), "demo").unwrap();

        let result = PromoteEngine::new(&backend, &snapshots)
            .promote("demo", host.path())
            .unwrap();
        assert!(result.success());

        // Host tree replaced by the mirror, .git untouched.
        assert!(host.path().join("shadow.txt").exists());
        assert!(!host.path().join("original.txt").exists());
        assert_eq!(
            fs::read_to_string(host.path().join(".git/HEAD")).unwrap(),
            "ref: main"
        );
    }

    #[test]
    fn promote_consumes_the_snapshot() {
        let state = tempdir().unwrap();
        let snapshots = SnapshotStore::new(state.path().join("snapshots")).unwrap();
        let host = host_workspace();

        let backend = FakeBackend::new();
        backend.write_workspace_file("shadow.txt", "mirror output");
        snapshots.capture(&backend.workspace(), "demo").unwrap();

        PromoteEngine::new(&backend, &snapshots)
            .promote("demo", host.path())
            .unwrap();
        assert!(!snapshots.exists("demo"));
    }

    #[test]
    fn promote_then_recapture_diffs_clean() {
        let state = tempdir().unwrap();
        let snapshots = SnapshotStore::new(state.path().join("snapshots")).unwrap();
        let host = host_workspace();

        let backend = FakeBackend::new();
        backend.write_workspace_file("shadow.txt", "mirror output");
        snapshots.capture(&backend.workspace(), "demo").unwrap();

        PromoteEngine::new(&backend, &snapshots)
            .promote("demo", host.path())
            .unwrap();

        // A fresh activation of the promoted tree diffs clean.
        snapshots.capture(host.path(), "demo").unwrap();
        let report = DiffEngine::new(&backend, &snapshots).diff("demo").unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn not_running_leaves_host_untouched() {
        let state = tempdir().unwrap();
        let snapshots = SnapshotStore::new(state.path().join("snapshots")).unwrap();
        let host = host_workspace();

        let backend = FakeBackend::new();
        snapshots.capture(&backend.workspace(), "demo").unwrap();
        backend.set_running(false);

        let err = PromoteEngine::new(&backend, &snapshots)
            .promote("demo", host.path())
            .unwrap_err();
        assert!(matches!(err, MirrorError::NotRunning(_)));

        // Zero files deleted.
        assert!(host.path().join("original.txt").exists());
        assert!(host.path().join(".git/HEAD").exists());
    }

    #[test]
    fn no_baseline_rejected_before_clearing() {
        let state = tempdir().unwrap();
        let snapshots = SnapshotStore::new(state.path().join("snapshots")).unwrap();
        let host = host_workspace();
        let backend = FakeBackend::new();

        let err = PromoteEngine::new(&backend, &snapshots)
            .promote("demo", host.path())
            .unwrap_err();
        assert!(matches!(err, MirrorError::NoBaseline(_)));
        assert!(host.path().join("original.txt").exists());
    }
}
