// system-tests/tests/helpers/stub.rs
// ============================================================================
// Module: Executable Resolution
// Description: Chooses the dds executable the suites drive.
// Purpose: Default to the bundled stand-in, honoring `DDS_TEST_EXE`.
// Dependencies: dds-harness
// ============================================================================

//! Executable resolution for system-tests.

use std::path::Path;
use std::path::PathBuf;

use dds_harness::Fixture;
use dds_harness::HarnessConfig;
use dds_harness::HarnessResult;

/// Path of the stand-in binary built alongside these tests.
pub const STUB_EXE: &str = env!("CARGO_BIN_EXE_dds_stub");

/// Returns true when the suites drive the bundled stand-in.
///
/// Assertions on stand-in output files only hold in that case.
pub fn using_stub(fixture: &Fixture) -> bool {
    fixture.exe() == Path::new(STUB_EXE)
}

/// Builds the fixture for `test_dir`.
///
/// `DDS_TEST_EXE` selects a real dds; otherwise the stand-in is used.
pub fn fixture(test_dir: impl Into<PathBuf>) -> HarnessResult<Fixture> {
    let config = HarnessConfig::load()?;
    let anchor = Path::new(env!("CARGO_MANIFEST_DIR"));
    if config.exe.is_some() {
        return Fixture::from_config(&config, anchor, test_dir);
    }
    Ok(Fixture::with_executable(STUB_EXE, test_dir)?.toolchain(config.toolchain))
}
