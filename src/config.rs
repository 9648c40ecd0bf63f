//! Driver configuration.
//!
//! The only environment-driven setting is the location of the target
//! executable. Everything else defaults to paths under the project root and
//! can be overridden with the builder-style setters, which is how tests give
//! each case an isolated workspace.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the target executable path.
pub const BIN_ENV_VAR: &str = "BIBTEX_TIDY_BIN";

/// Default wall-clock budget for one child process.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Default extension for temp files in the workspace.
pub const DEFAULT_EXTENSION: &str = "bib";

/// Settings shared by every invocation of one [`Harness`](crate::Harness).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Target executable.
    pub bin: PathBuf,
    /// Scratch directory holding `tmp<index>.<extension>` files.
    pub workspace: PathBuf,
    /// Extension used for temp file names.
    pub extension: String,
    /// Wall-clock budget for the child process.
    pub timeout: Duration,
}

impl HarnessConfig {
    /// Builds a configuration rooted at `root`, ignoring the environment.
    ///
    /// The executable defaults to `<root>/bin/bibtex-tidy` and the workspace
    /// to `<root>/.tmp`.
    pub fn rooted_at(root: &Path) -> Self {
        HarnessConfig {
            bin: root.join("bin").join("bibtex-tidy"),
            workspace: root.join(".tmp"),
            extension: DEFAULT_EXTENSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolves the configuration from the environment.
    ///
    /// `BIBTEX_TIDY_BIN` wins if set and non-empty; otherwise the defaults of
    /// [`HarnessConfig::rooted_at`] apply with the project root.
    pub fn from_env() -> Self {
        let config = Self::rooted_at(&project_root());
        match env::var_os(BIN_ENV_VAR) {
            Some(bin) if !bin.is_empty() => config.with_bin(bin),
            _ => config,
        }
    }

    pub fn with_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.bin = bin.into();
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Root of this project (the directory holding `Cargo.toml`).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}
