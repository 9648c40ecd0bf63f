//! tidy-harness: black-box test driver for the bibtex-tidy command line.
//!
//! This library provides functionality to:
//! - Materialize input documents as temp files in a shared scratch workspace
//! - Run the target executable with file arguments or a piped stdin payload
//! - Read back the tidied files and pick warning identifiers out of stderr
//! - Clean up temp files on every exit path

pub mod args;
pub mod config;
pub mod driver;
pub mod error;
pub mod process;
pub mod warnings;
pub mod workspace;

pub use args::ToCliArgs;
pub use config::{HarnessConfig, BIN_ENV_VAR};
pub use driver::{CliResult, Harness, Input};
pub use error::HarnessError;
pub use process::{run_process, ProcessOutcome};
pub use warnings::extract_warnings;
pub use workspace::{TempFiles, Workspace};

/// Runs the target once with the environment-derived configuration.
///
/// Shorthand for `Harness::from_env().run(input, options)`.
pub fn test_cli<O: ToCliArgs + ?Sized>(
    input: &Input,
    options: &O,
) -> Result<CliResult, HarnessError> {
    Harness::from_env().run(input, options)
}
