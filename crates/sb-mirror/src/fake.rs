// fake.rs — Test double for the execution backend.
//
// Emulates a container whose /workspace is a real temp directory on
// disk, so transport/diff/promote tests exercise actual tree movement
// without docker. The "clear workspace" exec deliberately reports exit
// status 1 (the hidden-file glob with nothing to remove) to exercise
// the tolerance path in MirrorTransport.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sb_backend::{Backend, BackendError, ExecResult, Service, StartOptions};
use tempfile::TempDir;

pub(crate) struct FakeBackend {
    root: TempDir,
    running: AtomicBool,
    fail_copies: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("fake backend tempdir");
        fs::create_dir_all(root.path().join("workspace")).expect("fake workspace dir");
        Self {
            root,
            running: AtomicBool::new(true),
            fail_copies: AtomicBool::new(false),
        }
    }

    pub fn workspace(&self) -> PathBuf {
        self.root.path().join("workspace")
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn set_fail_copies(&self, fail: bool) {
        self.fail_copies.store(fail, Ordering::SeqCst);
    }

    pub fn write_workspace_file(&self, rel: &str, content: &str) {
        let path = self.workspace().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("workspace parent");
        }
        fs::write(path, content).expect("workspace write");
    }

    pub fn remove_workspace_file(&self, rel: &str) {
        fs::remove_file(self.workspace().join(rel)).expect("workspace remove");
    }

    pub fn workspace_files(&self) -> Vec<String> {
        let ws = self.workspace();
        let mut files = Vec::new();
        collect(&ws, &ws, &mut files).expect("workspace walk");
        files.sort();
        files
    }
}

impl Backend for FakeBackend {
    fn start(&self, _shadow: &str, _opts: &StartOptions) -> Result<ExecResult, BackendError> {
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
        _service: Service,
        command: &str,
        _timeout: Duration,
    ) -> Result<ExecResult, BackendError> {
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
        if self.fail_copies.load(Ordering::SeqCst) {
            return Ok(ExecResult::failure("copy into container failed"));
        }
        copy_all(host_path, &self.workspace()).map_err(BackendError::Io)?;
        Ok(ExecResult::ok("copied in"))
    }

    fn copy_out(&self, _shadow: &str, dest: &Path) -> Result<ExecResult, BackendError> {
        if self.fail_copies.load(Ordering::SeqCst) {
            return Ok(ExecResult::failure("copy out of container failed"));
        }
        copy_all(&self.workspace(), dest).map_err(BackendError::Io)?;
        Ok(ExecResult::ok("copied out"))
    }

    fn is_running(&self, _shadow: &str) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn logs(&self, _shadow: &str, _service: Service, _tail: u32) -> Result<ExecResult, BackendError> {
        Ok(ExecResult::ok("fake logs"))
    }
}

/// Unfiltered recursive copy, like `docker cp` of a directory's contents.
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

fn collect(dir: &Path, root: &Path, files: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect(&path, root, files)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            files.push(rel.to_string_lossy().to_string());
        }
    }
    Ok(())
}
