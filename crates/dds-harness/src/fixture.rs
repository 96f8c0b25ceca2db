// crates/dds-harness/src/fixture.rs
// ============================================================================
// Module: Harness Fixtures
// Description: Executable lookup, scoped harness provisioning, and variants.
// Purpose: Hand each test a fresh harness whose teardown is already registered.
// Dependencies: crate::config, crate::harness, crate::scope, tracing
// ============================================================================

//! ## Overview
//! A [`Fixture`] knows where the dds executable lives and which directory
//! holds the test's static assets. It provisions one [`Dds`] per test body,
//! each inside its own [`Scope`], so the scratch directory is removed on
//! every exit path.
//!
//! Parametrized tests describe their project variants with
//! [`fixture_conf`] (one run per named sub-directory) or [`fixture_conf_1`]
//! (a single implicit variant) and run them with [`FixtureSet::run`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::error::HarnessResult;
use crate::harness::Dds;
use crate::harness::DdsBuilder;
use crate::platform::HostPlatform;
use crate::scope::Scope;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Base name of the tool executable, without platform suffix.
pub const DDS_EXE_STEM: &str = "dds";
/// Identifier used by [`fixture_conf_1`].
pub const SINGLE_VARIANT_IDENT: &str = "only";
/// Display id used by [`fixture_conf_1`].
pub const SINGLE_VARIANT_ID: &str = ".";

// ============================================================================
// SECTION: Executable Lookup
// ============================================================================

/// Returns `<anchor>/<build_subdir>/dds<suffix>`.
#[must_use]
pub fn locate_dds_exe(anchor: &Path, build_subdir: &Path, platform: HostPlatform) -> PathBuf {
    anchor.join(build_subdir).join(format!("{DDS_EXE_STEM}{}", platform.exe_suffix()))
}

// ============================================================================
// SECTION: Fixture
// ============================================================================

/// Shared inputs for provisioning harnesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Tool executable.
    exe: PathBuf,
    /// Static test asset directory.
    test_dir: PathBuf,
    /// Resolved host platform.
    platform: HostPlatform,
    /// Toolchain override passed to every harness.
    toolchain: Option<String>,
}

impl Fixture {
    /// Resolves the executable from the environment, falling back to the
    /// conventional build directory under `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] for invalid environment values,
    /// [`HarnessError::UnsupportedPlatform`] on unsupported hosts, and
    /// [`HarnessError::Fixture`] when the executable does not exist.
    pub fn from_env(anchor: &Path, test_dir: impl Into<PathBuf>) -> HarnessResult<Self> {
        let config = HarnessConfig::load()?;
        Self::from_config(&config, anchor, test_dir)
    }

    /// Resolves the executable from an already-loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnsupportedPlatform`] on unsupported hosts and
    /// [`HarnessError::Fixture`] when the executable does not exist.
    pub fn from_config(
        config: &HarnessConfig,
        anchor: &Path,
        test_dir: impl Into<PathBuf>,
    ) -> HarnessResult<Self> {
        let platform = HostPlatform::detect()?;
        let exe = config
            .exe
            .clone()
            .unwrap_or_else(|| locate_dds_exe(anchor, &config.build_subdir, platform));
        if !exe.is_file() {
            return Err(HarnessError::Fixture(format!(
                "dds executable not found at {}",
                exe.display()
            )));
        }
        info!(exe = %exe.display(), "using dds executable");
        Ok(Self {
            exe,
            test_dir: test_dir.into(),
            platform,
            toolchain: config.toolchain.clone(),
        })
    }

    /// Uses an explicit executable without checking that it exists.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnsupportedPlatform`] on unsupported hosts.
    pub fn with_executable(exe: impl Into<PathBuf>, test_dir: impl Into<PathBuf>) -> HarnessResult<Self> {
        Ok(Self {
            exe: exe.into(),
            test_dir: test_dir.into(),
            platform: HostPlatform::detect()?,
            toolchain: None,
        })
    }

    /// Sets the toolchain override passed to every harness.
    #[must_use]
    pub fn toolchain(mut self, toolchain: Option<String>) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Returns the tool executable.
    #[must_use]
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Returns the static test asset directory.
    #[must_use]
    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    /// Returns a harness builder for `project_dir` preloaded with this fixture.
    #[must_use]
    pub fn dds_builder(&self, project_dir: impl Into<PathBuf>) -> DdsBuilder {
        Dds::builder(&self.exe, &self.test_dir, project_dir)
            .platform(self.platform)
            .default_toolchain(self.toolchain.clone())
    }

    /// Builds a harness for `project_dir` and registers its cleanup with `scope`.
    ///
    /// # Errors
    ///
    /// Propagates harness construction failures.
    pub fn dds(&self, project_dir: impl Into<PathBuf>, scope: &mut Scope) -> HarnessResult<Dds> {
        self.dds_builder(project_dir).build(scope)
    }

    /// Runs `body` with a fresh harness for `project_dir` in its own scope.
    ///
    /// # Errors
    ///
    /// Returns the body's error if it failed, otherwise any cleanup error.
    pub fn with_dds<T>(
        &self,
        project_dir: impl Into<PathBuf>,
        body: impl FnOnce(&Dds) -> HarnessResult<T>,
    ) -> HarnessResult<T> {
        scoped(|scope| self.dds(project_dir, scope), body)
    }
}

/// Runs `body` with a harness built from explicit inputs in its own scope.
///
/// # Errors
///
/// Returns construction errors, the body's error, or a cleanup error, in
/// that order of precedence.
pub fn scoped_dds<T>(
    exe: impl Into<PathBuf>,
    test_dir: impl Into<PathBuf>,
    project_dir: impl Into<PathBuf>,
    body: impl FnOnce(&Dds) -> HarnessResult<T>,
) -> HarnessResult<T> {
    scoped(|scope| Dds::new(exe, test_dir, project_dir, scope), body)
}

/// Builds a harness inside a fresh scope, runs `body`, then closes the scope.
fn scoped<T>(
    make: impl FnOnce(&mut Scope) -> HarnessResult<Dds>,
    body: impl FnOnce(&Dds) -> HarnessResult<T>,
) -> HarnessResult<T> {
    let mut scope = Scope::new();
    let dds = make(&mut scope)?;
    let result = body(&dds);
    drop(dds);
    let closed = scope.close();
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) | (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup)) => {
            warn!(error = %cleanup, "cleanup failed after test failure");
            Err(err)
        }
    }
}

// ============================================================================
// SECTION: Parametrization
// ============================================================================

/// One project-directory variant of a parametrized test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureParams {
    /// Variant identifier.
    pub ident: String,
    /// Project sub-directory relative to the test directory.
    pub subdir: PathBuf,
}

impl FixtureParams {
    /// Creates a parameter set.
    #[must_use]
    pub fn new(ident: impl Into<String>, subdir: impl Into<PathBuf>) -> Self {
        Self {
            ident: ident.into(),
            subdir: subdir.into(),
        }
    }
}

/// Ordered variants with their display ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    /// Variants in declaration order.
    params: Vec<FixtureParams>,
    /// Display id per variant.
    ids: Vec<String>,
}

/// Declares one run per parameter set, identified by its `ident`.
#[must_use]
pub fn fixture_conf(params: impl IntoIterator<Item = FixtureParams>) -> FixtureSet {
    let params: Vec<FixtureParams> = params.into_iter().collect();
    let ids = params.iter().map(|param| param.ident.clone()).collect();
    FixtureSet {
        params,
        ids,
    }
}

/// Declares exactly one run against `subdir`.
#[must_use]
pub fn fixture_conf_1(subdir: impl Into<PathBuf>) -> FixtureSet {
    FixtureSet {
        params: vec![FixtureParams::new(SINGLE_VARIANT_IDENT, subdir)],
        ids: vec![SINGLE_VARIANT_ID.to_string()],
    }
}

impl FixtureSet {
    /// Returns the variants.
    #[must_use]
    pub fn params(&self) -> &[FixtureParams] {
        &self.params
    }

    /// Returns the display ids, parallel to [`FixtureSet::params`].
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Runs `body` once per variant, each with its own harness and scope.
    ///
    /// Every variant runs even when an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Variant`] wrapping the first failure.
    pub fn run(
        &self,
        fixture: &Fixture,
        mut body: impl FnMut(&FixtureParams, &Dds) -> HarnessResult<()>,
    ) -> HarnessResult<()> {
        let mut first_error = None;
        for (param, id) in self.params.iter().zip(&self.ids) {
            let project_dir = fixture.test_dir.join(&param.subdir);
            info!(variant = %id, project = %project_dir.display(), "running fixture variant");
            if let Err(err) = fixture.with_dds(project_dir, |dds| body(param, dds)) {
                warn!(variant = %id, error = %err, "fixture variant failed");
                if first_error.is_none() {
                    first_error = Some(HarnessError::Variant {
                        ident: param.ident.clone(),
                        source: Box::new(err),
                    });
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
