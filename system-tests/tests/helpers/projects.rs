// system-tests/tests/helpers/projects.rs
// ============================================================================
// Module: Staged Projects
// Description: Temporary test directories holding dds projects.
// Purpose: Give every test its own project tree so parallel runs never share
//          a scratch directory.
// Dependencies: system-tests, tempfile
// ============================================================================

//! Staged project trees for system-tests.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use system_tests::catalog::CatalogJson;
use system_tests::project::MANIFEST_NAME;
use system_tests::project::PackageManifest;
use system_tests::project::SOURCE_DIR_NAME;
use tempfile::TempDir;

/// A temporary test directory with one or more projects.
pub struct StagedTests {
    dir: TempDir,
}

impl StagedTests {
    /// Creates an empty test directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Returns the test directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a project under `subdir` with a manifest and `sources`.
    ///
    /// Source paths are relative to the project's `src/` directory.
    pub fn project(
        &self,
        subdir: &str,
        name: &str,
        version: &str,
        sources: &[(&str, &str)],
    ) -> io::Result<PathBuf> {
        let root = self.dir.path().join(subdir);
        let src = root.join(SOURCE_DIR_NAME);
        fs::create_dir_all(&src)?;
        let manifest = PackageManifest {
            name: name.to_string(),
            version: version.to_string(),
            namespace: "test".to_string(),
        };
        let bytes = serde_json::to_vec_pretty(&manifest).map_err(io::Error::other)?;
        fs::write(root.join(MANIFEST_NAME), bytes)?;
        for (relative, content) in sources {
            let path = src.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(root)
    }

    /// Writes a catalog import document into the test directory.
    pub fn catalog_json(&self, file_name: &str, doc: &CatalogJson) -> io::Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        let bytes = serde_json::to_vec_pretty(doc).map_err(io::Error::other)?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes raw bytes into the test directory.
    pub fn file(&self, file_name: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// A small library with one library source, one app, and one test.
pub const SIMPLE_SOURCES: &[(&str, &str)] = &[
    ("simple/lib.cpp", "int simple_value() { return 42; }\n"),
    ("simple.main.cpp", "int main() { return 0; }\n"),
    ("simple.test.cpp", "int main() { return 0; }\n"),
];
