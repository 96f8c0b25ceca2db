// crates/dds-harness/src/platform.rs
// ============================================================================
// Module: Host Platform
// Description: Host platform classification and its dds test defaults.
// Purpose: Resolve toolchain and executable suffix defaults once, failing loud.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The harness supports exactly two host families. Anything else is a
//! configuration error raised when the harness is built, before any process
//! is spawned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::HarnessError;
use crate::error::HarnessResult;

// ============================================================================
// SECTION: Host Platform
// ============================================================================

/// Supported host platform families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    /// Unix-like hosts.
    Posix,
    /// Windows hosts.
    Windows,
}

impl HostPlatform {
    /// Classifies the platform the harness was compiled for.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnsupportedPlatform`] for any family other than
    /// `unix` or `windows`.
    pub fn detect() -> HarnessResult<Self> {
        Self::from_family(std::env::consts::FAMILY)
    }

    /// Classifies a platform family name as reported by `std::env::consts::FAMILY`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnsupportedPlatform`] for unknown families.
    pub fn from_family(family: &str) -> HarnessResult<Self> {
        match family {
            "unix" => Ok(Self::Posix),
            "windows" => Ok(Self::Windows),
            other => Err(HarnessError::UnsupportedPlatform {
                family: other.to_string(),
            }),
        }
    }

    /// Returns the builtin toolchain used when a test does not pick one.
    #[must_use]
    pub const fn default_toolchain(self) -> &'static str {
        match self {
            Self::Posix => ":c++17:gcc-9",
            Self::Windows => ":c++17:msvc",
        }
    }

    /// Returns the executable file suffix.
    #[must_use]
    pub const fn exe_suffix(self) -> &'static str {
        match self {
            Self::Posix => "",
            Self::Windows => ".exe",
        }
    }
}
