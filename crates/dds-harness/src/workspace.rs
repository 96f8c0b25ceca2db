// crates/dds-harness/src/workspace.rs
// ============================================================================
// Module: Scratch Workspace
// Description: Per-test scratch directory and its derived paths.
// Purpose: Give every test a disposable area under its project directory.
// Dependencies: std::fs, tracing
// ============================================================================

//! ## Overview
//! The scratch directory is always `<project>/_test_scratch`. Every other
//! path the harness hands to the tool is a fixed offset beneath it, so the
//! layout needs no storage of its own and cannot drift.
//! Invariants:
//! - Derived paths are pure functions of the scratch directory.
//! - [`Workspace::cleanup`] is idempotent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::error::HarnessError;
use crate::error::HarnessResult;

// ============================================================================
// SECTION: Layout Constants
// ============================================================================

/// Scratch directory name under the project directory.
pub const SCRATCH_DIR_NAME: &str = "_test_scratch";
/// Repository cache directory under the scratch directory.
pub const REPO_DIR_NAME: &str = "repo";
/// Catalog database file under the scratch directory.
pub const CATALOG_FILE_NAME: &str = "catalog.db";
/// Dependency build output under the scratch directory.
pub const DEPS_BUILD_DIR_NAME: &str = "deps-build";
/// Main build output under the scratch directory.
pub const BUILD_DIR_NAME: &str = "build";
/// Generated library index file under the scratch directory.
pub const LMI_FILE_NAME: &str = "INDEX.lmi";

// ============================================================================
// SECTION: Workspace
// ============================================================================

/// Scratch directory owned by one harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Root of the scratch area.
    scratch_dir: PathBuf,
}

impl Workspace {
    /// Computes the workspace for a project directory.
    #[must_use]
    pub fn for_project(project_dir: &Path) -> Self {
        Self {
            scratch_dir: project_dir.join(SCRATCH_DIR_NAME),
        }
    }

    /// Returns the scratch directory.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Returns the repository cache directory.
    #[must_use]
    pub fn repo_dir(&self) -> PathBuf {
        self.scratch_dir.join(REPO_DIR_NAME)
    }

    /// Returns the catalog database path.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.scratch_dir.join(CATALOG_FILE_NAME)
    }

    /// Returns the dependency build output directory.
    #[must_use]
    pub fn deps_build_dir(&self) -> PathBuf {
        self.scratch_dir.join(DEPS_BUILD_DIR_NAME)
    }

    /// Returns the main build output directory.
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.scratch_dir.join(BUILD_DIR_NAME)
    }

    /// Returns the generated index path.
    #[must_use]
    pub fn lmi_path(&self) -> PathBuf {
        self.scratch_dir.join(LMI_FILE_NAME)
    }

    /// Creates the scratch directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Workspace`] when the directory cannot be created.
    pub fn ensure_exists(&self) -> HarnessResult<()> {
        fs::create_dir_all(&self.scratch_dir)
            .map_err(|err| HarnessError::workspace("create", &self.scratch_dir, err))
    }

    /// Removes the scratch directory recursively if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Workspace`] when removal fails for any reason
    /// other than the directory already being gone.
    pub fn cleanup(&self) -> HarnessResult<()> {
        remove_scratch(&self.scratch_dir)
    }
}

/// Removes `dir` recursively, treating a missing directory as success.
pub(crate) fn remove_scratch(dir: &Path) -> HarnessResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            info!(scratch = %dir.display(), "removed scratch directory");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(HarnessError::workspace("remove", dir, err)),
    }
}
