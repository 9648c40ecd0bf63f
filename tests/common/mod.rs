//! Shared test helpers: stub targets and isolated harnesses.
//!
//! Stub targets are tiny POSIX shell scripts written into a temp directory
//! and marked executable, so the tests never depend on a real bibtex-tidy
//! build.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use tidy_harness::{Harness, HarnessConfig};

/// Exits 0 without touching its input files.
pub const ECHO_STUB: &str = r#"echo "tidied $# argument(s)""#;

/// Prints each file argument's contents to stdout.
pub const CAT_FILES_STUB: &str = r#"for f in "$@"; do
  case "$f" in
    -*) ;;
    *) cat "$f" ;;
  esac
done"#;

/// Reads stdin when given `-`, prints it back upper-cased.
pub const STDIN_UPPER_STUB: &str = r#"if [ "$1" = "-" ]; then
  tr 'a-z' 'A-Z'
else
  echo "expected -" >&2
  exit 64
fi"#;

/// Upper-cases each input file in place and reports a warning per file.
pub const UPPERCASE_IN_PLACE_STUB: &str = r#"for f in "$@"; do
  case "$f" in
    -*) ;;
    *)
      tr 'a-z' 'A-Z' < "$f" > "$f.out" && mv "$f.out" "$f"
      echo "CHANGED: $f" >&2
      ;;
  esac
done"#;

/// Emits a fixed mix of diagnostic and free-form stderr lines.
pub const WARNINGS_STUB: &str = r#"echo "DUPLICATE_KEY: key 'a' appears twice" >&2
echo "processing..." >&2
echo "" >&2
echo "MISSING_KEY: entry has no key" >&2
echo "DUPLICATE_KEY: key 'b' appears twice" >&2
echo done"#;

/// Prints its arguments one per line.
pub const ARGS_STUB: &str = r#"for a in "$@"; do echo "$a"; done"#;

/// Fails with a syntax error on stderr, whatever stdout says.
pub const FAILING_STUB: &str = r#"echo "looks fine"
echo "Syntax error: unexpected '}' on line 3" >&2
exit 2"#;

/// Never finishes on its own.
pub const HANGING_STUB: &str = "exec sleep 30";

/// Deletes its first input file and exits 0.
pub const DELETING_STUB: &str = r#"rm -f "$1""#;

/// A stub executable and an isolated workspace, both removed on drop.
pub struct Sandbox {
    dir: TempDir,
    pub bin: PathBuf,
}

impl Sandbox {
    /// Writes `body` as an executable `sh` script.
    pub fn new(body: &str) -> Sandbox {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bibtex-tidy");
        write_script(&bin, body);
        Sandbox { dir, bin }
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.dir.path().join(".tmp")
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::rooted_at(self.dir.path())
            .with_bin(&self.bin)
            .with_timeout(Duration::from_secs(20))
    }

    pub fn harness(&self) -> Harness {
        Harness::new(self.config())
    }

    /// Path of a scratch file next to the stub, outside the workspace.
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Names of the files currently left in the workspace.
    pub fn leftover_files(&self) -> Vec<String> {
        list_dir(&self.workspace_dir())
    }
}

pub fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// A small but realistic bibliography entry.
pub fn bibtex(key: &str) -> String {
    format!(
        "@article{{{},\n  title = {{A study of {}}},\n  year = {{2020}}\n}}\n",
        key, key
    )
}

/// Reads a pid the stub wrote to `path`, waiting briefly for it to appear.
pub fn read_pid(path: &Path) -> u32 {
    for _ in 0..200 {
        if let Ok(text) = fs::read_to_string(path) {
            if let Ok(pid) = text.trim().parse() {
                return pid;
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("no pid written to {}", path.display());
}

/// Whether `pid` is a live (non-zombie) process.
#[cfg(target_os = "linux")]
pub fn process_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // The state letter follows the parenthesised command name.
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .map_or(false, |state| state != "Z" && state != "X"),
        Err(_) => false,
    }
}

/// Waits up to two seconds for `pid` to disappear.
#[cfg(target_os = "linux")]
pub fn wait_for_exit(pid: u32) -> bool {
    for _ in 0..200 {
        if !process_alive(pid) {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}
