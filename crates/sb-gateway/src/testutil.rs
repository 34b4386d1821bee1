// testutil.rs — Test double for the execution backend.
//
// Like the mirror crate's fake, backed by a real temp directory so the
// lifecycle tests move actual file trees, plus scripted responses for
// forge-side exec commands so bootstrap can be tested without a
// container.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use sb_backend::{Backend, BackendError, ExecResult, Service, StartOptions};
use tempfile::TempDir;

pub(crate) struct FakeBackend {
    root: TempDir,
    running: AtomicBool,
    fail_start: AtomicBool,
    forge_responses: Mutex<Vec<ExecResult>>,
    forge_commands: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("fake backend tempdir");
        fs::create_dir_all(root.path().join("workspace")).expect("fake workspace dir");
        Self {
            root,
            running: AtomicBool::new(true),
            fail_start: AtomicBool::new(false),
            forge_responses: Mutex::new(Vec::new()),
            forge_commands: Mutex::new(Vec::new()),
        }
    }

    pub fn workspace(&self) -> PathBuf {
        self.root.path().join("workspace")
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Queue the next responses for forge-service exec calls, consumed
    /// in order.
    pub fn script_forge(&self, responses: Vec<ExecResult>) {
        let mut queue = self.forge_responses.lock().unwrap();
        *queue = responses;
        queue.reverse();
    }

    pub fn forge_commands(&self) -> Vec<String> {
        self.forge_commands.lock().unwrap().clone()
    }
}

impl Backend for FakeBackend {
    fn start(&self, _shadow: &str, _opts: &StartOptions) -> Result<ExecResult, BackendError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Ok(ExecResult::failure("compose up failed"));
        }
        self.set_running(true);
        Ok(ExecResult::ok("started"))
    }

    fn stop(&self, _shadow: &str, _purge_data: bool) -> Result<ExecResult, BackendError> {
        self.set_running(false);
        Ok(ExecResult::ok("stopped"))
    }

    fn exec(
        &self,
        _shadow: &str,
        service: Service,
        command: &str,
        _timeout: Duration,
    ) -> Result<ExecResult, BackendError> {
        if matches!(service, Service::Forge) {
            self.forge_commands.lock().unwrap().push(command.to_string());
            let scripted = self.forge_responses.lock().unwrap().pop();
            return Ok(scripted.unwrap_or_else(|| ExecResult::ok("")));
        }
        if command.starts_with("rm -rf /workspace") {
            let ws = self.workspace();
            for entry in fs::read_dir(&ws).map_err(BackendError::Io)? {
                let entry = entry.map_err(BackendError::Io)?;
                let path = entry.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path).map_err(BackendError::Io)?;
                } else {
                    fs::remove_file(&path).map_err(BackendError::Io)?;
                }
            }
            return Ok(ExecResult {
                status_code: 1,
                stdout: String::new(),
                stderr: "no hidden files to remove".to_string(),
            });
        }
        Ok(ExecResult::ok(format!("ran: {command}")))
    }

    fn copy_in(&self, _shadow: &str, host_path: &Path) -> Result<ExecResult, BackendError> {
        copy_all(host_path, &self.workspace()).map_err(BackendError::Io)?;
        Ok(ExecResult::ok("copied in"))
    }

    fn copy_out(&self, _shadow: &str, dest: &Path) -> Result<ExecResult, BackendError> {
        copy_all(&self.workspace(), dest).map_err(BackendError::Io)?;
        Ok(ExecResult::ok("copied out"))
    }

    fn is_running(&self, _shadow: &str) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn logs(&self, _shadow: &str, service: Service, tail: u32) -> Result<ExecResult, BackendError> {
        Ok(ExecResult::ok(format!(
            "last {tail} lines from {}",
            service.name()
        )))
    }
}

fn copy_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let to = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_all(&entry.path(), &to)?;
        } else {
            fs::copy(entry.path(), &to)?;
        }
    }
    Ok(())
}
