//! Invocation orchestration and result assembly.
//!
//! A call moves through: write temp files, build arguments, run the target,
//! then either read the files back and extract warnings, or surface the
//! failure. Temp files are removed on every path.

use std::path::PathBuf;

use serde::Serialize;

use crate::args::ToCliArgs;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::process::{render_command, run_process};
use crate::warnings::extract_warnings;
use crate::workspace::{TempFiles, Workspace};

/// Positional token telling the target to read from stdin.
pub const STDIN_ARG: &str = "-";

/// What to feed the target: files on disk or a stdin payload, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Each document becomes one temp file passed as a positional argument.
    Files(Vec<String>),
    /// Piped to the target's stdin, with `-` as the only positional argument.
    Stdin(String),
}

impl Input {
    pub fn files<I, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Input::Files(docs.into_iter().map(Into::into).collect())
    }

    pub fn stdin(payload: impl Into<String>) -> Self {
        Input::Stdin(payload.into())
    }
}

impl From<&[&str]> for Input {
    fn from(docs: &[&str]) -> Self {
        Input::files(docs.iter().copied())
    }
}

/// The outcome of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CliResult {
    /// Final contents of each input file, in input order. Empty for stdin input.
    pub bibtexs: Vec<String>,
    /// Warning identifiers from stderr, duplicates and order preserved.
    pub warnings: Vec<String>,
    /// Raw stdout of the target.
    pub stdout: String,
}

/// Runs the target executable against temp copies of the given documents.
///
/// The workspace is shared by every call on the same harness; calls must not
/// overlap.
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    workspace: Workspace,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        let workspace = Workspace::new(config.workspace.clone(), config.extension.clone());
        Harness { config, workspace }
    }

    /// Harness configured from the environment (see [`HarnessConfig::from_env`]).
    pub fn from_env() -> Self {
        Self::new(HarnessConfig::from_env())
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Runs the target once.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::FileAccess`] if a temp file cannot be written, read back or removed
    /// - [`HarnessError::Launch`] if the executable cannot be started
    /// - [`HarnessError::Timeout`] if the target exceeds the configured timeout
    /// - [`HarnessError::Execution`] if the target exits non-zero
    pub fn run<O: ToCliArgs + ?Sized>(
        &self,
        input: &Input,
        options: &O,
    ) -> Result<CliResult, HarnessError> {
        self.workspace.ensure()?;

        let mut files = TempFiles::new(&self.workspace);
        let mut args: Vec<String> = Vec::new();
        let stdin = match input {
            Input::Files(docs) => {
                for doc in docs {
                    let path = files.push(doc)?;
                    args.push(path_arg(path));
                }
                None
            }
            Input::Stdin(payload) => {
                args.push(STDIN_ARG.to_string());
                Some(payload.as_str())
            }
        };
        args.extend(options.to_cli_args());

        // On any early return below, dropping `files` removes them.
        let outcome = run_process(&self.config.bin, &args, stdin, self.config.timeout)?;
        if !outcome.success() {
            return Err(HarnessError::Execution {
                command: render_command(&self.config.bin, &args),
                status: outcome.status,
                stderr: outcome.stderr,
            });
        }

        let bibtexs = files.read_all()?;
        let warnings = extract_warnings(&outcome.stderr);
        files.finish()?;

        Ok(CliResult {
            bibtexs,
            warnings,
            stdout: outcome.stdout,
        })
    }
}

fn path_arg(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
