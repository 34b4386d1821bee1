// process.rs — Child process execution with a hard deadline.
//
// std::process has no built-in timeout, so we spawn the child with
// piped output, drain the pipes on worker threads, and poll try_wait()
// against the deadline. On expiry the child is killed and reaped, and
// the caller gets a TIMEOUT_STATUS result instead of blocking forever.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::result::ExecResult;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run a command to completion, capturing output, with a hard deadline.
///
/// Returns `Err` only if the command could not be spawned. A timeout is
/// reported in-band as an [`ExecResult`] with status `-1`.
pub(crate) fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
) -> std::io::Result<ExecResult> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn()?;

    // The reader threads own only the pipes; the calling thread keeps
    // exclusive kill authority over the child.
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            let stdout = join_lossy(stdout_reader);
            let stderr = join_lossy(stderr_reader);
            return Ok(ExecResult {
                // A signal-terminated child has no exit code; fold it
                // into the generic failure sentinel.
                status_code: status.code().unwrap_or(-1),
                stdout,
                stderr,
            });
        }

        if Instant::now() >= deadline {
            let _ = child.kill();
            reap(&mut child);
            // Killing the child closes its end of the pipes, so the
            // reader threads see EOF and finish.
            let partial = join_lossy(stdout_reader);
            let _ = join_lossy(stderr_reader);
            return Ok(ExecResult::timed_out(timeout, partial));
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Run a command with no deadline (for fast local tooling like probes).
pub(crate) fn run_to_completion(mut cmd: Command) -> std::io::Result<ExecResult> {
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;
    Ok(ExecResult {
        status_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Spawn a thread that reads a pipe to EOF and returns the bytes.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_lossy(handle: JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Bounded reap after a kill: poll try_wait() briefly so the child does
/// not linger as a zombie. Failure here is tolerable — the result the
/// caller sees is already a timeout.
fn reap(child: &mut Child) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        match child.try_wait() {
            Ok(Some(_)) | Err(_) => return,
            Ok(None) => thread::sleep(POLL_INTERVAL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo hello; exit 3"]);
        let result = run_with_timeout(cmd, Duration::from_secs(10)).unwrap();
        assert_eq!(result.status_code, 3);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn deadline_expiry_yields_timeout_sentinel() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 30"]);
        let result = run_with_timeout(cmd, Duration::from_millis(100)).unwrap();
        assert!(result.is_timeout());
        assert!(result.stderr.contains("timed out"));
    }

    #[test]
    fn spawn_failure_is_an_error_not_a_result() {
        let cmd = Command::new("sb-definitely-not-a-real-binary");
        assert!(run_with_timeout(cmd, Duration::from_secs(1)).is_err());
    }
}
