// crates/dds-harness/src/test_support.rs
// ============================================================================
// Module: Harness Test Support
// Description: Recording process runner for spawn-free unit tests.
// Purpose: Capture argv/cwd pairs and replay scripted exit codes.
// Dependencies: std
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only helpers favor direct unwrap/expect for clarity."
)]

use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use crate::error::HarnessResult;
use crate::process::ProcessOutput;
use crate::process::ProcessRunner;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
}

#[derive(Default)]
struct State {
    calls: Vec<Invocation>,
    scripted: VecDeque<ProcessOutput>,
}

/// Runner that records calls and replays queued outputs (exit 0 when empty).
#[derive(Clone, Default)]
pub struct RecordingRunner {
    state: Arc<Mutex<State>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next result.
    pub fn push_exit(&self, exit_code: i32, stdout: &str) {
        self.state.lock().unwrap().scripted.push_back(ProcessOutput {
            exit_code,
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        });
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_argv(&self) -> Vec<String> {
        self.calls().last().expect("no recorded calls").argv.clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn execute(&self, argv: &[OsString], cwd: &Path) -> HarnessResult<ProcessOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Invocation {
            argv: argv.iter().map(|arg| arg.to_string_lossy().into_owned()).collect(),
            cwd: cwd.to_path_buf(),
        });
        Ok(state.scripted.pop_front().unwrap_or_default())
    }
}
