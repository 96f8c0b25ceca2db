// system-tests/src/lib.rs
// ============================================================================
// Module: dds System Tests Library
// Description: Shared models for the dds stand-in and the system-test suites.
// Purpose: Keep the stub's on-disk formats in one place.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate hosts the `dds_stub` binary, a deterministic stand-in for the
//! dds executable, and the integration suites in `system-tests/tests` that
//! drive it (or a real dds named by `DDS_TEST_EXE`) through `dds-harness`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod project;
