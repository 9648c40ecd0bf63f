//! Error taxonomy for a single driver invocation.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that terminate an invocation of the target executable.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The executable could not be started (missing, not executable, spawn error).
    #[error("failed to launch '{}': {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The child outlived the allotted wall-clock budget and was killed.
    #[error("CLI timed out after {timeout:?}\n> {command}")]
    Timeout { command: String, timeout: Duration },

    /// The child was started but the OS failed to report its status.
    #[error("failed to wait on target: {source}\n> {command}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The child exited with a non-zero status (or was killed by a signal).
    #[error("CLI error ({}):\n> {command}\n{stderr}", describe_status(.status))]
    Execution {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// A temp file (or the workspace itself) could not be written, read or removed.
    #[error("temp file '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match *status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}
