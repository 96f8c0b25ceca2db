// crates/dds-harness/src/fileutil.rs
// ============================================================================
// Module: File Fixtures
// Description: Scoped file overrides inside a test project.
// Purpose: Let a test rewrite a project file and get the original back.
// Dependencies: std::fs, tracing
// ============================================================================

//! ## Overview
//! [`ContentsGuard`] writes new bytes to a file and remembers what was there
//! before. Restoring (explicitly or on drop) writes the original bytes back,
//! or removes the file if it did not exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use tracing::warn;

use crate::error::HarnessError;
use crate::error::HarnessResult;

// ============================================================================
// SECTION: Contents Guard
// ============================================================================

/// Overrides a file's contents until restored or dropped.
#[derive(Debug)]
pub struct ContentsGuard {
    /// File being overridden.
    path: PathBuf,
    /// Original bytes; `None` when the file did not exist.
    original: Option<Vec<u8>>,
    /// Set once the original state has been put back.
    restored: bool,
}

impl ContentsGuard {
    /// Returns the overridden file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restores the original contents now.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Workspace`] when the file cannot be restored.
    pub fn restore(mut self) -> HarnessResult<()> {
        self.restore_in_place()
    }

    /// Restores the original state once.
    fn restore_in_place(&mut self) -> HarnessResult<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        match &self.original {
            Some(bytes) => fs::write(&self.path, bytes)
                .map_err(|err| HarnessError::workspace("restore", &self.path, err)),
            None => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(HarnessError::workspace("remove", &self.path, err)),
            },
        }
    }
}

impl Drop for ContentsGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restore_in_place() {
            warn!(error = %err, "failed to restore file contents");
        }
    }
}

/// Writes `content` to `path`, returning a guard that restores the original.
///
/// Parent directories are created when missing.
///
/// # Errors
///
/// Returns [`HarnessError::Workspace`] when the original cannot be read or
/// the new contents cannot be written.
pub fn set_contents(path: impl Into<PathBuf>, content: &[u8]) -> HarnessResult<ContentsGuard> {
    let path = path.into();
    let original = match fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(HarnessError::workspace("read", &path, err)),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| HarnessError::workspace("create", parent, err))?;
    }
    fs::write(&path, content).map_err(|err| HarnessError::workspace("write", &path, err))?;
    Ok(ContentsGuard {
        path,
        original,
        restored: false,
    })
}
