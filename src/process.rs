//! Running the target executable.
//!
//! One call spawns exactly one child, optionally feeds it a stdin payload,
//! drains both output streams on helper threads and blocks until the child
//! exits and its output is complete, or the timeout fires. On Unix the child
//! leads its own process group, so a timeout kills everything the target
//! started, not just the target itself.

use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::HarnessError;

/// How often the child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What a finished child left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` if the child was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs `program` with `args` and captures its output.
///
/// With `stdin` set the payload is written to the child's input and the pipe
/// closed; otherwise the child gets a null input.
///
/// The timeout covers the whole call: a target that exits while a background
/// process it started still holds stdout or stderr open is timed out too.
///
/// # Errors
///
/// - [`HarnessError::Launch`] if the program cannot be spawned
/// - [`HarnessError::Timeout`] if it is still running, or its output is still
///   open, after `timeout`
/// - [`HarnessError::Wait`] if the OS fails to report the child's status
pub fn run_process<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    stdin: Option<&str>,
    timeout: Duration,
) -> Result<ProcessOutcome, HarnessError> {
    let command_line = render_command(program, args);
    tracing::debug!(command = %command_line, "spawning target");

    let deadline = Instant::now() + timeout;
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    let mut child = command.spawn().map_err(|source| HarnessError::Launch {
        program: program.to_path_buf(),
        source,
    })?;

    let writer = match (stdin, child.stdin.take()) {
        (Some(payload), Some(mut pipe)) => {
            let payload = payload.to_owned();
            let (tx, rx) = mpsc::channel();
            // Dropping the pipe at the end of the closure closes the child's stdin.
            thread::spawn(move || {
                let _ = tx.send(pipe.write_all(payload.as_bytes()));
            });
            Some(rx)
        }
        _ => None,
    };
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let timed_out = || {
        tracing::warn!(command = %command_line, ?timeout, "target timed out, killing");
        HarnessError::Timeout {
            command: command_line.clone(),
            timeout,
        }
    };

    let status = match wait_until(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill_and_reap(&mut child);
            return Err(timed_out());
        }
        Err(source) => {
            kill_and_reap(&mut child);
            return Err(HarnessError::Wait {
                command: command_line.clone(),
                source,
            });
        }
    };

    // The child is gone, but anything it left running may still hold the pipes.
    let (stdout, stderr) = match (collect(stdout, deadline), collect(stderr, deadline)) {
        (Some(out), Some(err)) => (out, err),
        _ => {
            kill_group(&child);
            return Err(timed_out());
        }
    };

    if let Some(Ok(Err(e))) = writer.map(|rx| rx.try_recv()) {
        // The child may legitimately exit without reading all of stdin.
        if e.kind() != io::ErrorKind::BrokenPipe {
            tracing::warn!(error = %e, "failed to write stdin payload");
        }
    }

    let outcome = ProcessOutcome {
        status: status.code(),
        stdout,
        stderr,
    };
    tracing::debug!(status = ?outcome.status, "target exited");
    Ok(outcome)
}

/// Renders `program args...` for diagnostics.
pub fn render_command<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Polls the child until it exits (`Some`) or `deadline` passes (`None`).
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill_and_reap(child: &mut Child) {
    kill_group(child);
    if let Err(e) = child.kill() {
        if e.kind() != io::ErrorKind::InvalidInput {
            tracing::warn!(error = %e, "failed to kill target");
        }
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "failed to reap target");
    }
}

/// Kills every process in the child's group.
#[cfg(unix)]
fn kill_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) takes plain integers; a negative pid addresses the
    // group the child leads (spawned with process_group(0)).
    let result = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if result != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(error = %err, pgid, "failed to kill target process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Waits for a reader to hit EOF, up to `deadline`. `None` means the pipe
/// was still open when the deadline passed.
fn collect(reader: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<String> {
    let Some(rx) = reader else {
        return Some(String::new());
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(buf) => Some(String::from_utf8_lossy(&buf).into_owned()),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}
