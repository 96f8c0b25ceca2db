// crates/dds-harness/src/lib.rs
// ============================================================================
// Module: dds Harness Library
// Description: Process-driving harness for dds integration tests.
// Purpose: Run dds subcommands against disposable per-test workspaces.
// Dependencies: thiserror, tracing
// ============================================================================

//! ## Overview
//! The harness drives an externally built `dds` executable through its CLI.
//! It does not build anything itself. A test obtains a [`Dds`] from a
//! [`Fixture`], calls facade operations such as [`Dds::build`] or
//! [`Dds::catalog_import`], and relies on the owning [`Scope`] to delete the
//! scratch directory afterwards.
//! Invariants:
//! - Checked runs surface every non-zero exit as [`HarnessError::CommandFailed`].
//! - Scratch directories are removed on every scope exit path.
//! - Harness instances share no mutable state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cmdline;
pub mod config;
pub mod error;
pub mod fileutil;
pub mod fixture;
pub mod harness;
pub mod platform;
pub mod process;
pub mod scope;
pub mod workspace;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cmdline::Arg;
pub use cmdline::CommandLine;
pub use cmdline::flatten_cmd;
pub use config::HarnessConfig;
pub use error::CommandFailure;
pub use error::HarnessError;
pub use error::HarnessResult;
pub use fileutil::ContentsGuard;
pub use fixture::Fixture;
pub use fixture::FixtureParams;
pub use fixture::FixtureSet;
pub use fixture::fixture_conf;
pub use fixture::fixture_conf_1;
pub use fixture::locate_dds_exe;
pub use fixture::scoped_dds;
pub use harness::BuildOptions;
pub use harness::Dds;
pub use harness::DdsBuilder;
pub use platform::HostPlatform;
pub use process::CommandOutput;
pub use process::ProcessOutput;
pub use process::ProcessRunner;
pub use process::SystemProcess;
pub use scope::Scope;
pub use workspace::Workspace;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod test_support;
