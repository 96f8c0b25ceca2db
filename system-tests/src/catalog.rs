// system-tests/src/catalog.rs
// ============================================================================
// Module: Stub Catalog
// Description: Catalog database and import format used by the dds stand-in.
// Purpose: Give `catalog create/import/get` and `build-deps` real state.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The stand-in keeps its catalog as a JSON document on disk. Imports use the
//! dds v1 catalog JSON shape: a `version` field and a `packages` map of
//! package name to version to entry.
//! Invariants:
//! - Only import documents with `version == 1` are accepted.
//! - Requirements are `name@version` and match exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Supported catalog import format version.
pub const CATALOG_JSON_VERSION: u32 = 1;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog or import file could not be read or written.
    #[error("{action} {}: {source}", path.display())]
    Io {
        /// Attempted operation.
        action: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Document is not valid catalog JSON.
    #[error("invalid catalog data in {}: {source}", path.display())]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Import document declares an unsupported version.
    #[error("unsupported catalog JSON version {0}")]
    UnsupportedVersion(u32),
    /// Requirement string is not `name@version`.
    #[error("invalid requirement \"{0}\": expected name@version")]
    InvalidRequirement(String),
    /// Requirement has no matching catalog entry.
    #[error("no package in the catalog matched {0}")]
    NotFound(String),
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Git remote a package is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRemote {
    /// Repository URL.
    pub url: String,
    /// Ref to check out.
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// One package version in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Remote source, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitRemote>,
    /// Dependency name to version range.
    #[serde(default)]
    pub depends: BTreeMap<String, String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Package name to version to entry.
pub type PackageMap = BTreeMap<String, BTreeMap<String, PackageEntry>>;

/// Catalog import document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogJson {
    /// Format version; must be [`CATALOG_JSON_VERSION`].
    pub version: u32,
    /// Packages to import.
    pub packages: PackageMap,
}

impl CatalogJson {
    /// Creates an empty import document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: CATALOG_JSON_VERSION,
            packages: BTreeMap::new(),
        }
    }

    /// Adds one package version.
    #[must_use]
    pub fn package(mut self, name: &str, version: &str, entry: PackageEntry) -> Self {
        self.packages.entry(name.to_string()).or_default().insert(version.to_string(), entry);
        self
    }
}

impl Default for CatalogJson {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed `name@version` requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name.
    pub name: String,
    /// Exact version.
    pub version: String,
}

impl Requirement {
    /// Parses `name@version`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRequirement`] when either half is empty.
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        match raw.split_once('@') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => Ok(Self {
                name: name.to_string(),
                version: version.to_string(),
            }),
            _ => Err(CatalogError::InvalidRequirement(raw.to_string())),
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

// ============================================================================
// SECTION: Catalog Database
// ============================================================================

/// On-disk catalog database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDb {
    /// Known packages.
    pub packages: PackageMap,
}

impl CatalogDb {
    /// Loads the catalog at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        read_json(path)
    }

    /// Loads the catalog at `path`, or an empty one if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when an existing file is malformed.
    pub fn load_or_default(path: &Path) -> Result<Self, CatalogError> {
        if path.exists() { Self::load(path) } else { Ok(Self::default()) }
    }

    /// Writes the catalog to `path`. The parent directory must exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes).map_err(|source| CatalogError::Io {
            action: "write",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merges an import document from `json_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the document is unreadable, malformed,
    /// or declares an unsupported version.
    pub fn import(&mut self, json_path: &Path) -> Result<usize, CatalogError> {
        let doc: CatalogJson = read_json(json_path)?;
        if doc.version != CATALOG_JSON_VERSION {
            return Err(CatalogError::UnsupportedVersion(doc.version));
        }
        let mut imported = 0;
        for (name, versions) in doc.packages {
            let slot = self.packages.entry(name).or_default();
            for (version, entry) in versions {
                slot.insert(version, entry);
                imported += 1;
            }
        }
        Ok(imported)
    }

    /// Looks up an exact requirement.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when no entry matches.
    pub fn get(&self, req: &Requirement) -> Result<&PackageEntry, CatalogError> {
        self.packages
            .get(&req.name)
            .and_then(|versions| versions.get(&req.version))
            .ok_or_else(|| CatalogError::NotFound(req.to_string()))
    }
}

/// Reads and parses a JSON file.
fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CatalogError> {
    let bytes = fs::read(path).map_err(|source| CatalogError::Io {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
