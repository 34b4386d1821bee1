// compose.rs — Docker-compose implementation of the Backend trait.
//
// One compose project per shadow: the project is parameterized through
// environment variables (SHADOW_NAME, WORKSPACE_DIR, FORGE_PORT) that
// the compose file interpolates. Data movement uses `docker cp` against
// the `<shadow>-workspace` container, matching the volume layout the
// compose template defines.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::BackendError;
use crate::process::{run_to_completion, run_with_timeout};
use crate::result::ExecResult;
use crate::{Backend, Service, StartOptions};

// Every backend operation carries a deadline — control always returns
// to the caller (see run_with_timeout). Image builds dominate `start`.
const START_TIMEOUT: Duration = Duration::from_secs(600);
const STOP_TIMEOUT: Duration = Duration::from_secs(120);
const COPY_TIMEOUT: Duration = Duration::from_secs(600);
const LOGS_TIMEOUT: Duration = Duration::from_secs(30);

/// Execution backend shelling out to `docker compose` / `docker cp`.
pub struct ComposeBackend {
    compose_file: PathBuf,
}

impl ComposeBackend {
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        Self {
            compose_file: compose_file.into(),
        }
    }

    /// Name of the workspace container for a shadow (compose names the
    /// container `<SHADOW_NAME>-workspace` via `container_name:`).
    fn workspace_container(shadow: &str) -> String {
        format!("{shadow}-workspace")
    }

    /// Base `docker compose` invocation bound to a shadow.
    ///
    /// Only SHADOW_NAME must be exact on every call; WORKSPACE_DIR and
    /// FORGE_PORT have compose-file defaults and are pinned explicitly
    /// by `start`, the one operation where they matter.
    fn compose(&self, shadow: &str) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("compose")
            .arg("-f")
            .arg(&self.compose_file)
            .env("SHADOW_NAME", shadow);
        cmd
    }
}

impl Backend for ComposeBackend {
    fn start(&self, shadow: &str, opts: &StartOptions) -> Result<ExecResult, BackendError> {
        tracing::info!(shadow, port = opts.forge_port, "starting execution context");
        let mut cmd = self.compose(shadow);
        cmd.env("WORKSPACE_DIR", &opts.workspace_dir)
            .env("FORGE_PORT", opts.forge_port.to_string())
            .args(["up", "-d", "--build"]);
        Ok(run_with_timeout(cmd, START_TIMEOUT)?)
    }

    fn stop(&self, shadow: &str, purge_data: bool) -> Result<ExecResult, BackendError> {
        tracing::info!(shadow, purge_data, "stopping execution context");
        let mut cmd = self.compose(shadow);
        cmd.arg("down");
        if purge_data {
            cmd.arg("-v");
        }
        Ok(run_with_timeout(cmd, STOP_TIMEOUT)?)
    }

    fn exec(
        &self,
        shadow: &str,
        service: Service,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, BackendError> {
        tracing::debug!(shadow, service = service.name(), command, "exec");
        let mut cmd = self.compose(shadow);
        // -T: no TTY, required for non-interactive automation.
        cmd.args(["exec", "-T", service.name(), "bash", "-c", command]);
        Ok(run_with_timeout(cmd, timeout)?)
    }

    fn copy_in(&self, shadow: &str, host_path: &Path) -> Result<ExecResult, BackendError> {
        let container = Self::workspace_container(shadow);
        let mut cmd = Command::new("docker");
        // `<src>/.` copies directory *contents*, not the directory itself.
        cmd.arg("cp")
            .arg(format!("{}/.", host_path.display()))
            .arg(format!("{container}:/workspace/"));
        Ok(run_with_timeout(cmd, COPY_TIMEOUT)?)
    }

    fn copy_out(&self, shadow: &str, dest: &Path) -> Result<ExecResult, BackendError> {
        let container = Self::workspace_container(shadow);
        let mut cmd = Command::new("docker");
        cmd.arg("cp")
            .arg(format!("{container}:/workspace/."))
            .arg(dest);
        Ok(run_with_timeout(cmd, COPY_TIMEOUT)?)
    }

    fn is_running(&self, shadow: &str) -> bool {
        let mut cmd = self.compose(shadow);
        cmd.args(["ps", "--status", "running", "-q"]);
        match run_to_completion(cmd) {
            // `ps -q` prints one container id per running service;
            // empty output means nothing is up.
            Ok(result) => result.success() && !result.stdout.trim().is_empty(),
            Err(_) => false,
        }
    }

    fn logs(&self, shadow: &str, service: Service, tail: u32) -> Result<ExecResult, BackendError> {
        let mut cmd = self.compose(shadow);
        cmd.args(["logs", "--tail", &tail.to_string(), service.name()]);
        Ok(run_with_timeout(cmd, LOGS_TIMEOUT)?)
    }
}
