// crates/dds-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error types raised by the dds test harness.
// Purpose: Separate expected tool failures from harness misconfiguration.
// Dependencies: thiserror, std
// ============================================================================

//! ## Overview
//! [`HarnessError`] covers both failure classes a test can observe: the
//! external tool exiting non-zero on a checked run ([`HarnessError::CommandFailed`])
//! and harness configuration failures (unsupported host, missing executable,
//! invalid environment). Configuration failures are fatal and never retried.
//! Invariants:
//! - `CommandFailed` is only produced by checked execution.
//! - Variants are stable for programmatic handling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Command Failure
// ============================================================================

/// Diagnostic payload attached to a failed checked run.
///
/// # Invariants
/// - `argv[0]` is the tool executable; the rest is the flattened command line.
/// - `exit_code` is never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// Exit code reported by the child process.
    pub exit_code: i32,
    /// Full resolved argument vector, byte-for-byte as passed to the child.
    pub argv: Vec<OsString>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandFailure {
    /// Returns the argument vector lossily decoded for display.
    #[must_use]
    pub fn argv_strings(&self) -> Vec<String> {
        self.argv.iter().map(|arg| arg.to_string_lossy().into_owned()).collect()
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command [{}] exited with status {}", self.argv_strings().join(" "), self.exit_code)
    }
}

// ============================================================================
// SECTION: Harness Errors
// ============================================================================

/// Errors returned by the harness.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The tool exited with a non-zero status on a checked run.
    #[error("{0}")]
    CommandFailed(Box<CommandFailure>),
    /// The child process could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The host platform family has no known toolchain or executable suffix.
    #[error("no dds test defaults are defined for platform family \"{family}\"")]
    UnsupportedPlatform {
        /// Platform family reported by the host.
        family: String,
    },
    /// A scratch directory or fixture file operation failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Workspace {
        /// Short description of the attempted operation.
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Fixture inputs are invalid or the tool executable cannot be located.
    #[error("fixture error: {0}")]
    Fixture(String),
    /// Environment configuration failed validation.
    #[error("configuration error: {0}")]
    Config(String),
    /// One parametrized fixture variant failed.
    #[error("fixture variant {ident} failed: {source}")]
    Variant {
        /// Identifier of the failing variant.
        ident: String,
        /// Failure raised by the variant.
        #[source]
        source: Box<HarnessError>,
    },
}

impl HarnessError {
    /// Returns the command failure payload when this is a checked-run failure.
    #[must_use]
    pub fn command_failure(&self) -> Option<&CommandFailure> {
        match self {
            Self::CommandFailed(failure) => Some(failure),
            Self::Variant {
                source, ..
            } => source.command_failure(),
            _ => None,
        }
    }

    /// Builds a workspace error for the given action and path.
    pub(crate) fn workspace(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Workspace {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
