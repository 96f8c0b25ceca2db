// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for dds system-tests.
// Purpose: Provide fixtures, staged projects, logging, and artifact utilities.
// Dependencies: system-tests, dds-harness, tempfile, tracing-subscriber
// ============================================================================

//! ## Overview
//! Shared helpers for dds system-tests.
//! Invariants:
//! - Every test stages its projects in its own temporary directory.
//! - The dds stand-in is used unless `DDS_TEST_EXE` names a real executable.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod logging;
pub mod projects;
pub mod stub;
