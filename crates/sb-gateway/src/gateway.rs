// gateway.rs — Per-shadow lifecycle controller.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sb_backend::{Backend, ExecResult, Service, StartOptions};
use sb_mirror::{DiffEngine, DiffReport, MirrorTransport, PromoteEngine};
use sb_store::{ConfigStore, CredentialStore, ShadowConfig, SnapshotStore, StateLayout};

use crate::error::GatewayError;
use crate::forge::ForgeClient;

/// Handle to one named shadow environment.
///
/// Owns the backend and the three stores; all state is partitioned by
/// the shadow name, so gateways for different names are fully
/// independent.
pub struct Gateway {
    shadow: String,
    workspace_path: PathBuf,
    forge_port: u16,
    backend: Box<dyn Backend>,
    configs: ConfigStore,
    credentials: CredentialStore,
    snapshots: SnapshotStore,
}

impl Gateway {
    /// Gateway for a (possibly new) shadow with explicit parameters.
    pub fn new(
        shadow: impl Into<String>,
        workspace_path: impl Into<PathBuf>,
        forge_port: u16,
        backend: Box<dyn Backend>,
        layout: &StateLayout,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            shadow: shadow.into(),
            workspace_path: workspace_path.into(),
            forge_port,
            backend,
            configs: ConfigStore::new(layout.config_dir())?,
            credentials: CredentialStore::new(layout.tokens_dir())?,
            snapshots: SnapshotStore::new(layout.snapshots_dir())?,
        })
    }

    /// Gateway reconstructed from the persisted config record.
    ///
    /// Diff and promote run in a later process invocation than
    /// activation; this recovers the original workspace path.
    pub fn from_saved_config(
        shadow: impl Into<String>,
        backend: Box<dyn Backend>,
        layout: &StateLayout,
    ) -> Result<Self, GatewayError> {
        let shadow = shadow.into();
        let configs = ConfigStore::new(layout.config_dir())?;
        let config = configs
            .get(&shadow)?
            .ok_or_else(|| GatewayError::NoConfig(shadow.clone()))?;
        Ok(Self {
            shadow,
            workspace_path: config.workspace_path,
            forge_port: config.forge_port,
            backend,
            configs,
            credentials: CredentialStore::new(layout.tokens_dir())?,
            snapshots: SnapshotStore::new(layout.snapshots_dir())?,
        })
    }

    pub fn shadow(&self) -> &str {
        &self.shadow
    }

    pub fn workspace_path(&self) -> &Path {
        &self.workspace_path
    }

    /// Forge URL as seen from the host.
    pub fn forge_url(&self) -> String {
        format!("http://localhost:{}", self.forge_port)
    }

    /// Forge URL as seen from inside the shadow network — this is the
    /// rewrite target module fetches should resolve against.
    pub fn forge_internal_url(&self) -> String {
        "http://forge:3000".to_string()
    }

    pub fn is_active(&self) -> bool {
        self.backend.is_running(&self.shadow)
    }

    /// Start the shadow and mirror the workspace into it.
    ///
    /// Order matters: backend start, mirror-in, snapshot capture, then
    /// config persist. A failure partway leaves no stale config record
    /// pointing at an uninitialized mirror.
    pub fn activate(&self) -> Result<ExecResult, GatewayError> {
        let opts = StartOptions {
            workspace_dir: self.workspace_path.clone(),
            forge_port: self.forge_port,
        };
        let started = self.backend.start(&self.shadow, &opts)?;
        if !started.success() {
            return Err(GatewayError::OperationFailed {
                op: "start",
                result: started,
            });
        }

        MirrorTransport::new(&*self.backend).copy_in(&self.shadow, &self.workspace_path)?;
        self.snapshots.capture(&self.workspace_path, &self.shadow)?;
        self.configs.put(
            &self.shadow,
            &ShadowConfig {
                workspace_path: self.workspace_path.clone(),
                forge_port: self.forge_port,
            },
        )?;

        tracing::info!(shadow = %self.shadow, "shadow activated");
        Ok(ExecResult::ok(format!(
            "shadow '{}' activated with workspace {}",
            self.shadow,
            self.workspace_path.display()
        )))
    }

    /// Stop the shadow. With `purge_data` the backend's volumes are
    /// destroyed, so the credential, snapshot, and config that
    /// reference them are deleted too — stale secrets and baselines
    /// must not outlive the data store they belong to.
    pub fn deactivate(&self, purge_data: bool) -> Result<ExecResult, GatewayError> {
        let stopped = self.backend.stop(&self.shadow, purge_data)?;
        if !stopped.success() {
            return Err(GatewayError::OperationFailed {
                op: "stop",
                result: stopped,
            });
        }

        if purge_data {
            self.credentials.delete(&self.shadow)?;
            self.snapshots.discard(&self.shadow)?;
            self.configs.delete(&self.shadow)?;
            tracing::info!(shadow = %self.shadow, "purged shadow state");
        }

        Ok(ExecResult::ok(format!("shadow '{}' stopped", self.shadow)))
    }

    /// Execute a shell command in the mirrored workspace.
    ///
    /// A non-zero exit from the command itself is returned as a value,
    /// not an error — callers decide what a failing command means.
    pub fn run_command(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, GatewayError> {
        if !self.is_active() {
            return Err(GatewayError::NotRunning(self.shadow.clone()));
        }
        Ok(self
            .backend
            .exec(&self.shadow, Service::Workspace, command, timeout)?)
    }

    /// Report divergence between the activation baseline and the mirror.
    pub fn diff(&self) -> Result<DiffReport, GatewayError> {
        Ok(DiffEngine::new(&*self.backend, &self.snapshots).diff(&self.shadow)?)
    }

    /// Overwrite the host workspace with the mirror's current state.
    pub fn promote(&self) -> Result<ExecResult, GatewayError> {
        Ok(PromoteEngine::new(&*self.backend, &self.snapshots)
            .promote(&self.shadow, &self.workspace_path)?)
    }

    /// Fetch recent log lines from a shadow service.
    pub fn logs(&self, service: Service, tail: u32) -> Result<ExecResult, GatewayError> {
        Ok(self.backend.logs(&self.shadow, service, tail)?)
    }

    /// Read a file from the host workspace, relative path.
    pub fn read_file(&self, rel_path: &str) -> Result<String, GatewayError> {
        Ok(fs::read_to_string(self.workspace_path.join(rel_path))?)
    }

    /// Write a file into the host workspace, creating parents.
    pub fn write_file(&self, rel_path: &str, content: &str) -> Result<(), GatewayError> {
        let path = self.workspace_path.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(fs::write(path, content)?)
    }

    /// Authenticated client for this shadow's forge API.
    pub fn forge_client(&self) -> Result<ForgeClient, GatewayError> {
        let token = self.credentials.get(&self.shadow)?;
        ForgeClient::new(self.forge_url(), token)
    }

    pub(crate) fn forge_port(&self) -> u16 {
        self.forge_port
    }

    pub(crate) fn backend(&self) -> &dyn Backend {
        &*self.backend
    }

    pub(crate) fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Remediation-bearing auth failure for this shadow.
    pub(crate) fn auth_failure(&self) -> GatewayError {
        GatewayError::AuthFailure {
            shadow: self.shadow.clone(),
            token_path: self.credentials.path(&self.shadow).display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeBackend;
    use tempfile::tempdir;

    fn host_workspace() -> tempfile::TempDir {
        let ws = tempdir().unwrap();
        fs::write(ws.path().join("app.rs"), "fn main() {}").unwrap();
        fs::create_dir_all(ws.path().join(".git")).unwrap();
        fs::write(ws.path().join(".git/HEAD"), "ref: main").unwrap();
        ws
    }

    fn gateway(ws: &Path, state: &Path, backend: FakeBackend) -> Gateway {
        Gateway::new(
            "demo",
            ws,
            3000,
            Box::new(backend),
            &StateLayout::new(state),
        )
        .unwrap()
    }

    #[test]
    fn activate_mirrors_snapshots_and_persists_config() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let backend = FakeBackend::new();
        let container = backend.workspace();
        let gw = gateway(ws.path(), state.path(), backend);

        let result = gw.activate().unwrap();
        assert!(result.success());

        // Mirror holds the workspace (docker cp copies .git too; the
        // snapshot filter applies only to the baseline).
        assert!(container.join("app.rs").exists());
        // Snapshot captured, filtered.
        assert!(gw.snapshots.exists("demo"));
        assert!(gw.snapshots.path("demo").join("app.rs").exists());
        assert!(!gw.snapshots.path("demo").join(".git").exists());
        // Config persisted last.
        let config = gw.configs.get("demo").unwrap().unwrap();
        assert_eq!(config.forge_port, 3000);
    }

    #[test]
    fn failed_start_leaves_no_stale_state() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let backend = FakeBackend::new();
        backend.set_fail_start(true);
        let gw = gateway(ws.path(), state.path(), backend);

        let err = gw.activate().unwrap_err();
        assert!(matches!(
            err,
            GatewayError::OperationFailed { op: "start", .. }
        ));
        assert!(!gw.snapshots.exists("demo"));
        assert!(gw.configs.get("demo").unwrap().is_none());
    }

    #[test]
    fn second_activation_replaces_the_baseline() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let gw = gateway(ws.path(), state.path(), FakeBackend::new());

        gw.activate().unwrap();

        // Host edit between activations.
        fs::write(ws.path().join("app.rs"), "fn main() { v2(); }").unwrap();
        gw.activate().unwrap();

        // The edit is part of the new baseline, so the diff is clean.
        let report = gw.diff().unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn run_command_requires_running_context() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let backend = FakeBackend::new();
        backend.set_running(false);
        let gw = gateway(ws.path(), state.path(), backend);

        let err = gw
            .run_command("echo hi", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotRunning(_)));
    }

    #[test]
    fn deactivate_with_purge_removes_all_state() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let gw = gateway(ws.path(), state.path(), FakeBackend::new());

        gw.activate().unwrap();
        gw.credentials.put("demo", "token").unwrap();

        gw.deactivate(true).unwrap();
        assert!(!gw.credentials.exists("demo"));
        assert!(!gw.snapshots.exists("demo"));
        assert!(gw.configs.get("demo").unwrap().is_none());
    }

    #[test]
    fn deactivate_without_purge_keeps_state() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let gw = gateway(ws.path(), state.path(), FakeBackend::new());

        gw.activate().unwrap();
        gw.deactivate(false).unwrap();

        assert!(gw.snapshots.exists("demo"));
        assert!(gw.configs.get("demo").unwrap().is_some());
    }

    #[test]
    fn forge_urls_distinguish_host_and_shadow_views() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let gw = gateway(ws.path(), state.path(), FakeBackend::new());

        assert_eq!(gw.forge_url(), "http://localhost:3000");
        assert_eq!(gw.forge_internal_url(), "http://forge:3000");
    }

    #[test]
    fn file_access_is_rooted_at_the_workspace() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let gw = gateway(ws.path(), state.path(), FakeBackend::new());

        gw.write_file("notes/plan.md", "step one").unwrap();
        assert_eq!(gw.read_file("notes/plan.md").unwrap(), "step one");
        assert!(ws.path().join("notes/plan.md").exists());
    }

    #[test]
    fn from_saved_config_recovers_workspace_path() {
        let ws = host_workspace();
        let state = tempdir().unwrap();
        let layout = StateLayout::new(state.path());
        {
            let gw = gateway(ws.path(), state.path(), FakeBackend::new());
            gw.activate().unwrap();
        }

        let gw =
            Gateway::from_saved_config("demo", Box::new(FakeBackend::new()), &layout).unwrap();
        assert_eq!(gw.workspace_path(), ws.path());

        let missing = Gateway::from_saved_config("ghost", Box::new(FakeBackend::new()), &layout);
        assert!(matches!(missing, Err(GatewayError::NoConfig(_))));
    }
}
