// system-tests/src/project.rs
// ============================================================================
// Module: Stub Project Model
// Description: Package manifest and source discovery for the dds stand-in.
// Purpose: Let the stand-in build, package, and export test projects.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A project is a directory holding `package.json5` (plain JSON is accepted,
//! which is also valid JSON5) and a `src/` tree. Sources ending in
//! `.test.cpp` are tests; other `.cpp` files are library or app sources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::catalog::CatalogError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Manifest file name at the project root.
pub const MANIFEST_NAME: &str = "package.json5";
/// Source directory under the project root.
pub const SOURCE_DIR_NAME: &str = "src";
/// Suffix marking test sources.
pub const TEST_SUFFIX: &str = ".test.cpp";
/// Suffix marking application sources.
pub const APP_SUFFIX: &str = ".main.cpp";

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Package namespace.
    #[serde(default)]
    pub namespace: String,
}

impl PackageManifest {
    /// Loads `package.json5` from `project_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the manifest is missing or malformed.
    pub fn load(project_dir: &Path) -> Result<Self, CatalogError> {
        let path = project_dir.join(MANIFEST_NAME);
        let bytes = fs::read(&path).map_err(|source| CatalogError::Io {
            action: "read",
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse {
            path,
            source,
        })
    }

    /// Returns `name@version`.
    #[must_use]
    pub fn ident(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

// ============================================================================
// SECTION: Source Discovery
// ============================================================================

/// Kind of a discovered source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Library source.
    Library,
    /// Application entry point.
    App,
    /// Test source.
    Test,
}

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the project directory, `/`-separated.
    pub relative: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Classification.
    pub kind: SourceKind,
}

/// Lists `.cpp` sources under `<project>/src`, sorted by relative path.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] when a directory cannot be read.
pub fn collect_sources(project_dir: &Path) -> Result<Vec<SourceFile>, CatalogError> {
    let mut files = Vec::new();
    let root = project_dir.join(SOURCE_DIR_NAME);
    if root.is_dir() {
        walk(project_dir, &root, &mut files)?;
    }
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

/// Lists every regular file under `dir` relative to `dir`, skipping `skip`.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] when a directory cannot be read.
pub fn collect_files(dir: &Path, skip: &str) -> Result<Vec<String>, CatalogError> {
    let mut out = Vec::new();
    collect_into(dir, dir, skip, &mut out)?;
    out.sort();
    Ok(out)
}

/// Recursive worker for [`collect_sources`].
fn walk(project_dir: &Path, dir: &Path, out: &mut Vec<SourceFile>) -> Result<(), CatalogError> {
    for path in read_dir_paths(dir)? {
        if path.is_dir() {
            walk(project_dir, &path, out)?;
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !name.ends_with(".cpp") {
            continue;
        }
        let kind = if name.ends_with(TEST_SUFFIX) {
            SourceKind::Test
        } else if name.ends_with(APP_SUFFIX) {
            SourceKind::App
        } else {
            SourceKind::Library
        };
        out.push(SourceFile {
            relative: relative_slash(project_dir, &path),
            path,
            kind,
        });
    }
    Ok(())
}

/// Recursive worker for [`collect_files`].
fn collect_into(
    root: &Path,
    dir: &Path,
    skip: &str,
    out: &mut Vec<String>,
) -> Result<(), CatalogError> {
    for path in read_dir_paths(dir)? {
        if path.file_name().and_then(|name| name.to_str()) == Some(skip) {
            continue;
        }
        if path.is_dir() {
            collect_into(root, &path, skip, out)?;
        } else {
            out.push(relative_slash(root, &path));
        }
    }
    Ok(())
}

/// Reads directory entries as paths.
fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let io_err = |source| CatalogError::Io {
        action: "read directory",
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        paths.push(entry.map_err(io_err)?.path());
    }
    Ok(paths)
}

/// Renders `path` relative to `root` with `/` separators.
fn relative_slash(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// SECTION: Build Outputs
// ============================================================================

/// Record the stand-in writes into a build output directory.
pub const BUILD_RECORD_NAME: &str = "stub-build.json";

/// Summary of one stand-in build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Package `name@version`.
    pub package: String,
    /// Toolchain the build used.
    pub toolchain: String,
    /// Whether warnings were enabled.
    pub warnings: bool,
    /// Relative paths of the sources compiled, in order.
    pub compiled: Vec<String>,
}

/// Source distribution written by `sdist create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdistArchive {
    /// Package `name@version`.
    pub package: String,
    /// Relative paths of the packaged files, sorted.
    pub files: Vec<String>,
}
