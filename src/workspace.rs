//! Scratch workspace for temp input files.
//!
//! Files are named `tmp<index>.<ext>` inside a single shared directory so a
//! failed run leaves predictable names to inspect. The directory itself is
//! created lazily and never torn down; individual files are owned by one
//! invocation through [`TempFiles`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::HarnessError;

/// A scratch directory plus the fixed naming scheme for files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    dir: PathBuf,
    extension: String,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Workspace {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory and any missing ancestors. Existing is fine.
    pub fn ensure(&self) -> Result<(), HarnessError> {
        fs::create_dir_all(&self.dir).map_err(|e| HarnessError::file_access(&self.dir, e))?;
        tracing::debug!(dir = %self.dir.display(), "workspace ready");
        Ok(())
    }

    /// Deterministic path for the file at `index`.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("tmp{}.{}", index, self.extension))
    }

    /// Creates or overwrites the file at `index` with UTF-8 `content`.
    pub fn write(&self, index: usize, content: &str) -> Result<PathBuf, HarnessError> {
        let path = self.path_for(index);
        fs::write(&path, content).map_err(|e| HarnessError::file_access(&path, e))?;
        Ok(path)
    }

    /// Reads the file at `index` back as UTF-8.
    pub fn read(&self, index: usize) -> Result<String, HarnessError> {
        let path = self.path_for(index);
        fs::read_to_string(&path).map_err(|e| HarnessError::file_access(&path, e))
    }

    pub fn remove(&self, index: usize) -> Result<(), HarnessError> {
        let path = self.path_for(index);
        fs::remove_file(&path).map_err(|e| HarnessError::file_access(&path, e))
    }
}

/// The temp files written for one invocation.
///
/// Dropping the guard removes every tracked file and only logs failures, so
/// an error already on its way to the caller is never replaced by a cleanup
/// error. [`TempFiles::finish`] is the strict variant for the success path.
#[derive(Debug)]
pub struct TempFiles<'a> {
    workspace: &'a Workspace,
    indices: Vec<usize>,
}

impl<'a> TempFiles<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        TempFiles {
            workspace,
            indices: Vec::new(),
        }
    }

    /// Writes `content` as the next file and starts tracking it.
    ///
    /// A write that fails after creating the file (a full disk, say) removes
    /// the partial file before returning the error.
    pub fn push(&mut self, content: &str) -> Result<PathBuf, HarnessError> {
        let index = self.indices.len();
        match self.workspace.write(index, content) {
            Ok(path) => {
                self.indices.push(index);
                Ok(path)
            }
            Err(e) => {
                match self.workspace.remove(index) {
                    Err(HarnessError::FileAccess { source, .. })
                        if source.kind() == io::ErrorKind::NotFound => {}
                    Err(cleanup) => {
                        tracing::warn!(error = %cleanup, "failed to clean up partial temp file")
                    }
                    Ok(()) => {}
                }
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Reads every tracked file back, in write order.
    pub fn read_all(&self) -> Result<Vec<String>, HarnessError> {
        self.indices
            .iter()
            .map(|&index| self.workspace.read(index))
            .collect()
    }

    /// Removes every tracked file, returning the first failure.
    ///
    /// All files are attempted even when an earlier removal fails.
    pub fn finish(mut self) -> Result<(), HarnessError> {
        let mut first_err = None;
        for index in std::mem::take(&mut self.indices) {
            if let Err(e) = self.workspace.remove(index) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for TempFiles<'_> {
    fn drop(&mut self) {
        for index in self.indices.drain(..) {
            if let Err(e) = self.workspace.remove(index) {
                tracing::warn!(error = %e, "failed to clean up temp file");
            }
        }
    }
}
