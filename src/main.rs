//! CLI for tidy-harness - Run bibtex-tidy against copies of bibliography files.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt as log_fmt, EnvFilter};

use tidy_harness::{CliResult, Harness, HarnessConfig, HarnessError, Input, BIN_ENV_VAR};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Run bibtex-tidy on temp copies of bibliography files and report the result as JSON
#[derive(Parser, Debug)]
#[command(name = "tidy-harness")]
#[command(version)]
#[command(after_help = "\
Examples:
  tidy-harness refs.bib -- --curly --numeric
  tidy-harness a.bib b.bib --bin ./bin/bibtex-tidy -- --merge=combine
  cat refs.bib | tidy-harness --stdin -- --sort=key")]
struct Cli {
    /// Bibliography files whose contents are copied into the workspace
    #[arg(conflicts_with = "stdin")]
    files: Vec<PathBuf>,

    /// Pipe this process's stdin to the target instead of using files
    #[arg(long)]
    stdin: bool,

    /// Target executable
    #[arg(short, long, env = BIN_ENV_VAR)]
    bin: Option<PathBuf>,

    /// Scratch directory for temp files
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Timeout for the target, in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Overwrite each input file with the tidied result
    #[arg(long, conflicts_with = "stdin")]
    write_back: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Arguments passed through to the target
    #[arg(last = true)]
    target_args: Vec<String>,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: input file not found / unreadable
    InputFile(String),
    /// Exit 11: target could not be launched
    Launch(String),
    /// Exit 12: target exceeded the timeout
    Timeout(String),
    /// Exit 13: target exited non-zero
    Execution(String),
    /// Exit 14: temp file or output file access failed
    FileAccess(String),
    /// Exit 15: target started but its status could not be collected
    Wait(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::Launch(_) => 11,
            AppError::Timeout(_) => 12,
            AppError::Execution(_) => 13,
            AppError::FileAccess(_) => 14,
            AppError::Wait(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::Launch(msg) => {
                write!(
                    f,
                    "{}\n  hint: build the target or point {} (or --bin) at it",
                    msg, BIN_ENV_VAR
                )
            }
            AppError::Timeout(msg) => {
                write!(f, "{}\n  hint: raise the limit with --timeout", msg)
            }
            AppError::Execution(msg) | AppError::FileAccess(msg) | AppError::Wait(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl From<HarnessError> for AppError {
    fn from(e: HarnessError) -> Self {
        match e {
            HarnessError::Launch { .. } => AppError::Launch(e.to_string()),
            HarnessError::Timeout { .. } => AppError::Timeout(e.to_string()),
            HarnessError::Execution { .. } => AppError::Execution(e.to_string()),
            HarnessError::FileAccess { .. } => AppError::FileAccess(e.to_string()),
            HarnessError::Wait { .. } => AppError::Wait(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    log_fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let harness = Harness::new(build_config(&cli));

    // 1. Resolve input mode
    let input = if cli.stdin {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::InputFile(format!("failed to read from stdin: {}", e)))?;
        Input::Stdin(buf)
    } else {
        Input::Files(read_inputs(&cli.files)?)
    };

    // 2. Run the target
    let result = harness.run(&input, &cli.target_args)?;

    // 3. Optionally write tidied documents back over the inputs
    if cli.write_back {
        write_back(&cli.files, &result)?;
    }

    // 4. Report
    print_result(&result)
}

fn build_config(cli: &Cli) -> HarnessConfig {
    let mut config = HarnessConfig::from_env();
    if let Some(bin) = &cli.bin {
        config = config.with_bin(bin);
    }
    if let Some(workspace) = &cli.workspace {
        config = config.with_workspace(workspace);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<String>, AppError> {
    files
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .map_err(|e| AppError::InputFile(format!("'{}': {}", path.display(), e)))
        })
        .collect()
}

fn write_back(files: &[PathBuf], result: &CliResult) -> Result<(), AppError> {
    for (path, content) in files.iter().zip(&result.bibtexs) {
        write_output(path, content)?;
    }
    eprintln!("tidied {} file(s)", files.len());
    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<(), AppError> {
    fs::write(path, content)
        .map_err(|e| AppError::FileAccess(format!("'{}': {}", path.display(), e)))
}

fn print_result(result: &CliResult) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| AppError::FileAccess(format!("stdout: {}", e)))?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).map_err(|e| AppError::FileAccess(format!("stdout: {}", e)))
}
