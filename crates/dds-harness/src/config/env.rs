// crates/dds-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for dds integration tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use crate::error::HarnessError;
use crate::error::HarnessResult;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Build-output subdirectory searched for the tool when no override is set.
pub const DEFAULT_BUILD_SUBDIR: &str = "_build";

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Explicit path to the dds executable.
    Exe,
    /// Build-output subdirectory under the fixture anchor.
    BuildSubdir,
    /// Toolchain used instead of the platform default.
    Toolchain,
    /// Root directory for system-test artifacts.
    RunRoot,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exe => "DDS_TEST_EXE",
            Self::BuildSubdir => "DDS_TEST_BUILD_SUBDIR",
            Self::Toolchain => "DDS_TEST_TOOLCHAIN",
            Self::RunRoot => "DDS_TEST_RUN_ROOT",
        }
    }

    /// Returns every key, for tests that snapshot and restore the environment.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Exe, Self::BuildSubdir, Self::Toolchain, Self::RunRoot]
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Explicit executable path override.
    pub exe: Option<PathBuf>,
    /// Build-output subdirectory under the fixture anchor.
    pub build_subdir: PathBuf,
    /// Toolchain override.
    pub toolchain: Option<String>,
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            exe: None,
            build_subdir: PathBuf::from(DEFAULT_BUILD_SUBDIR),
            toolchain: None,
            run_root: None,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when a value is not valid UTF-8, is
    /// empty, or fails validation.
    pub fn load() -> HarnessResult<Self> {
        let exe = read_env_nonempty(HarnessEnv::Exe.as_str())?.map(PathBuf::from);
        let build_subdir = read_env_nonempty(HarnessEnv::BuildSubdir.as_str())?
            .map(|value| parse_relative_dir(HarnessEnv::BuildSubdir.as_str(), &value))
            .transpose()?
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_SUBDIR));
        let toolchain = read_env_nonempty(HarnessEnv::Toolchain.as_str())?
            .map(|value| parse_toolchain(HarnessEnv::Toolchain.as_str(), &value))
            .transpose()?;
        let run_root = read_env_nonempty(HarnessEnv::RunRoot.as_str())?.map(PathBuf::from);
        Ok(Self {
            exe,
            build_subdir,
            toolchain,
            run_root,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> HarnessResult<Option<String>> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| HarnessError::Config(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> HarnessResult<Option<String>> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(HarnessError::Config(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a build subdirectory, which must stay relative to the anchor.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] for absolute paths.
fn parse_relative_dir(name: &str, raw: &str) -> HarnessResult<PathBuf> {
    let path = PathBuf::from(raw.trim());
    if path.is_absolute() {
        return Err(HarnessError::Config(format!("{name} must be a relative path")));
    }
    Ok(path)
}

/// Parses a toolchain identifier.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] when the value contains whitespace.
fn parse_toolchain(name: &str, raw: &str) -> HarnessResult<String> {
    let trimmed = raw.trim();
    if trimmed.chars().any(char::is_whitespace) {
        return Err(HarnessError::Config(format!("{name} must not contain whitespace")));
    }
    Ok(trimmed.to_string())
}
