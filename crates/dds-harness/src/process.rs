// crates/dds-harness/src/process.rs
// ============================================================================
// Module: Process Execution
// Description: Child-process primitive and the structured execution result.
// Purpose: Run one argv to completion and capture its exit code and streams.
// Dependencies: std::process, tracing
// ============================================================================

//! ## Overview
//! [`ProcessRunner`] is the seam between the harness and the operating
//! system. [`SystemProcess`] spawns a real child and blocks until it exits;
//! tests substitute a recording runner to inspect argument vectors without
//! spawning anything.
//! Invariants:
//! - One call spawns at most one child and waits for it.
//! - Exit codes are returned uninterpreted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;

use tracing::debug;

use crate::error::CommandFailure;
use crate::error::HarnessError;
use crate::error::HarnessResult;

// ============================================================================
// SECTION: Process Output
// ============================================================================

/// Raw outcome of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; negative signal number when the child was killed on Unix.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

// ============================================================================
// SECTION: Process Runner
// ============================================================================

/// Executes a flattened argument vector in a working directory.
pub trait ProcessRunner: Send + Sync {
    /// Runs `argv` (program first) in `cwd` and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Spawn`] when the child cannot be started or
    /// its output cannot be collected.
    fn execute(&self, argv: &[OsString], cwd: &Path) -> HarnessResult<ProcessOutput>;
}

/// Runner backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcess;

impl ProcessRunner for SystemProcess {
    fn execute(&self, argv: &[OsString], cwd: &Path) -> HarnessResult<ProcessOutput> {
        let Some((program, args)) = argv.split_first() else {
            return Err(HarnessError::Fixture("cannot execute an empty argument vector".to_string()));
        };
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| HarnessError::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;
        Ok(ProcessOutput {
            exit_code: exit_code(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Maps an exit status to an integer code.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|signal| -signal)).unwrap_or(-1)
}

/// Maps an exit status to an integer code.
#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

// ============================================================================
// SECTION: Command Output
// ============================================================================

/// Result of one harness execution.
///
/// # Invariants
/// - `argv[0]` is the tool executable followed by the flattened command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Resolved argument vector that produced this result.
    pub argv: Vec<OsString>,
    /// Working directory the child ran in.
    pub cwd: PathBuf,
    /// Exit code reported by the child.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Runs `argv` through `runner` and wraps the outcome.
    pub(crate) fn capture(
        runner: &dyn ProcessRunner,
        argv: Vec<OsString>,
        cwd: &Path,
    ) -> HarnessResult<Self> {
        debug!(argv = %render_argv(&argv), cwd = %cwd.display(), "running dds");
        let output = runner.execute(&argv, cwd)?;
        debug!(exit_code = output.exit_code, "dds exited");
        Ok(Self {
            argv,
            cwd: cwd.to_path_buf(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Returns true when the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns stdout decoded lossily as UTF-8.
    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Returns stderr decoded lossily as UTF-8.
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Returns the argument vector as display strings.
    #[must_use]
    pub fn argv_strings(&self) -> Vec<String> {
        self.argv.iter().map(|arg| arg.to_string_lossy().into_owned()).collect()
    }

    /// Returns the argument vector joined by spaces.
    #[must_use]
    pub fn argv_display(&self) -> String {
        render_argv(&self.argv)
    }

    /// Returns true when any argument equals `token`.
    #[must_use]
    pub fn has_arg(&self, token: &str) -> bool {
        self.argv.iter().any(|arg| arg == token)
    }

    /// Converts a non-zero exit into [`HarnessError::CommandFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::CommandFailed`] when the exit code is non-zero.
    pub fn check(self) -> HarnessResult<Self> {
        if self.success() {
            return Ok(self);
        }
        let stdout = self.stdout_text();
        let stderr = self.stderr_text();
        Err(HarnessError::CommandFailed(Box::new(CommandFailure {
            exit_code: self.exit_code,
            argv: self.argv,
            stdout,
            stderr,
        })))
    }
}

/// Joins an argument vector for logs and messages.
fn render_argv(argv: &[OsString]) -> String {
    argv.iter().map(|arg| arg.to_string_lossy()).collect::<Vec<_>>().join(" ")
}
