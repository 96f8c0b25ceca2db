// system-tests/tests/helpers/logging.rs
// ============================================================================
// Module: Test Logging
// Description: Tracing subscriber setup for system-tests.
// Purpose: Surface harness logs through the libtest capture.
// Dependencies: tracing-subscriber
// ============================================================================

//! Installs a `tracing` subscriber once per test binary. The filter comes
//! from `RUST_LOG` and defaults to `dds_harness=debug`.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "dds_harness=debug";

/// Installs the test subscriber if none is installed yet.
pub fn init() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}
