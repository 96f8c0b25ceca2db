// crates/dds-harness/src/harness.rs
// ============================================================================
// Module: dds Harness
// Description: Per-test handle that runs dds subcommands in a scratch workspace.
// Purpose: Assemble subcommand flags and run them checked or unchecked.
// Dependencies: crate::cmdline, crate::process, crate::workspace, tracing
// ============================================================================

//! ## Overview
//! [`Dds`] binds one dds executable to a test directory and a project
//! directory. Construction resolves the host platform and registers scratch
//! cleanup with the caller's [`Scope`], so teardown never depends on the test
//! remembering to call it.
//!
//! Each facade operation has a `*_cmd` twin that only assembles the command
//! line. The operation itself runs that command checked; tests that expect
//! the tool to fail pass the same command to [`Dds::run_unchecked`].
//! Invariants:
//! - The scratch directory is derived from the project directory.
//! - A checked run never returns a non-zero exit as success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cmdline::Arg;
use crate::cmdline::CommandLine;
use crate::error::HarnessResult;
use crate::fileutil::ContentsGuard;
use crate::fileutil::set_contents;
use crate::platform::HostPlatform;
use crate::process::CommandOutput;
use crate::process::ProcessRunner;
use crate::process::SystemProcess;
use crate::scope::Scope;
use crate::workspace::Workspace;
use crate::workspace::remove_scratch;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of the archive produced by [`Dds::sdist_create`].
pub const CREATED_SDIST_NAME: &str = "created-sdist.sds";

// ============================================================================
// SECTION: Build Options
// ============================================================================

/// Options for [`Dds::build`].
///
/// Every feature is enabled by default; disabling one adds the matching
/// `--no-*` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Toolchain override; `None` uses the harness default.
    pub toolchain: Option<String>,
    /// Build applications.
    pub apps: bool,
    /// Emit compiler warnings.
    pub warnings: bool,
    /// Build and run tests.
    pub tests: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            toolchain: None,
            apps: true,
            warnings: true,
            tests: true,
        }
    }
}

impl BuildOptions {
    /// Uses the given toolchain.
    #[must_use]
    pub fn toolchain(mut self, toolchain: impl Into<String>) -> Self {
        self.toolchain = Some(toolchain.into());
        self
    }

    /// Sets whether applications are built.
    #[must_use]
    pub const fn apps(mut self, apps: bool) -> Self {
        self.apps = apps;
        self
    }

    /// Sets whether warnings are enabled.
    #[must_use]
    pub const fn warnings(mut self, warnings: bool) -> Self {
        self.warnings = warnings;
        self
    }

    /// Sets whether tests are built.
    #[must_use]
    pub const fn tests(mut self, tests: bool) -> Self {
        self.tests = tests;
        self
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// How the builder determines the host platform.
#[derive(Debug, Clone)]
enum PlatformSource {
    /// Classify the compile target.
    Detect,
    /// Use a known platform.
    Known(HostPlatform),
    /// Classify an arbitrary family name.
    Family(String),
}

/// Builder for [`Dds`].
pub struct DdsBuilder {
    /// Tool executable.
    exe: PathBuf,
    /// Static test asset directory.
    test_dir: PathBuf,
    /// Mutable project directory.
    project_dir: PathBuf,
    /// Platform resolution strategy.
    platform: PlatformSource,
    /// Toolchain used when callers pass none.
    toolchain: Option<String>,
    /// Process primitive.
    runner: Arc<dyn ProcessRunner>,
}

impl DdsBuilder {
    /// Uses a known host platform instead of detecting it.
    #[must_use]
    pub fn platform(mut self, platform: HostPlatform) -> Self {
        self.platform = PlatformSource::Known(platform);
        self
    }

    /// Classifies the host from a platform family name such as `"unix"`.
    #[must_use]
    pub fn platform_family(mut self, family: impl Into<String>) -> Self {
        self.platform = PlatformSource::Family(family.into());
        self
    }

    /// Overrides the default toolchain for every operation.
    #[must_use]
    pub fn default_toolchain(mut self, toolchain: Option<String>) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Replaces the process primitive.
    #[must_use]
    pub fn runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    /// Builds the harness and registers scratch cleanup with `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::UnsupportedPlatform`] when the host
    /// platform is not supported. Nothing is registered in that case.
    pub fn build(self, scope: &mut Scope) -> HarnessResult<Dds> {
        let platform = match self.platform {
            PlatformSource::Detect => HostPlatform::detect()?,
            PlatformSource::Known(platform) => platform,
            PlatformSource::Family(family) => HostPlatform::from_family(&family)?,
        };
        let workspace = Workspace::for_project(&self.project_dir);
        let scratch = workspace.scratch_dir().to_path_buf();
        scope.defer(move || remove_scratch(&scratch));
        Ok(Dds {
            exe: self.exe,
            test_dir: self.test_dir,
            source_root: self.project_dir,
            workspace,
            platform,
            toolchain: self.toolchain,
            runner: self.runner,
        })
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Handle for driving dds from one test.
pub struct Dds {
    /// Tool executable.
    exe: PathBuf,
    /// Static test asset directory.
    test_dir: PathBuf,
    /// Mutable project directory; default working directory.
    source_root: PathBuf,
    /// Scratch workspace under the project directory.
    workspace: Workspace,
    /// Resolved host platform.
    platform: HostPlatform,
    /// Toolchain override applied when callers pass none.
    toolchain: Option<String>,
    /// Process primitive.
    runner: Arc<dyn ProcessRunner>,
}

impl Dds {
    /// Starts a builder with platform detection and real process execution.
    #[must_use]
    pub fn builder(
        exe: impl Into<PathBuf>,
        test_dir: impl Into<PathBuf>,
        project_dir: impl Into<PathBuf>,
    ) -> DdsBuilder {
        DdsBuilder {
            exe: exe.into(),
            test_dir: test_dir.into(),
            project_dir: project_dir.into(),
            platform: PlatformSource::Detect,
            toolchain: None,
            runner: Arc::new(SystemProcess),
        }
    }

    /// Builds a harness with default settings and registers its cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::UnsupportedPlatform`] on unsupported hosts.
    pub fn new(
        exe: impl Into<PathBuf>,
        test_dir: impl Into<PathBuf>,
        project_dir: impl Into<PathBuf>,
        scope: &mut Scope,
    ) -> HarnessResult<Self> {
        Self::builder(exe, test_dir, project_dir).build(scope)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

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

    /// Returns the project directory.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Returns the resolved host platform.
    #[must_use]
    pub const fn platform(&self) -> HostPlatform {
        self.platform
    }

    /// Returns the scratch workspace.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns the scratch directory.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.workspace.scratch_dir()
    }

    /// Returns the repository cache directory.
    #[must_use]
    pub fn repo_dir(&self) -> PathBuf {
        self.workspace.repo_dir()
    }

    /// Returns the catalog database path.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.workspace.catalog_path()
    }

    /// Returns the dependency build output directory.
    #[must_use]
    pub fn deps_build_dir(&self) -> PathBuf {
        self.workspace.deps_build_dir()
    }

    /// Returns the main build output directory.
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.workspace.build_dir()
    }

    /// Returns the generated index path.
    #[must_use]
    pub fn lmi_path(&self) -> PathBuf {
        self.workspace.lmi_path()
    }

    /// Returns the platform's builtin toolchain.
    #[must_use]
    pub const fn default_builtin_toolchain(&self) -> &'static str {
        self.platform.default_toolchain()
    }

    /// Returns the platform's executable suffix.
    #[must_use]
    pub const fn exe_suffix(&self) -> &'static str {
        self.platform.exe_suffix()
    }

    /// Resolves the toolchain for one call: explicit, then override, then builtin.
    ///
    /// Empty values count as absent.
    #[must_use]
    pub fn resolve_toolchain(&self, toolchain: Option<&str>) -> String {
        toolchain
            .filter(|tc| !tc.is_empty())
            .or_else(|| self.toolchain.as_deref().filter(|tc| !tc.is_empty()))
            .unwrap_or_else(|| self.default_builtin_toolchain())
            .to_string()
    }

    /// Returns the `--project-dir=<project>` argument.
    #[must_use]
    pub fn project_dir_arg(&self) -> Arg {
        Arg::flag_value("--project-dir", &self.source_root)
    }

    /// Returns the `--repo-dir=<repo>` argument.
    #[must_use]
    pub fn repo_dir_arg(&self) -> Arg {
        Arg::flag_value("--repo-dir", self.repo_dir())
    }

    /// Returns the `--catalog=<catalog.db>` argument.
    fn catalog_arg(&self) -> Arg {
        Arg::flag_value("--catalog", self.catalog_path())
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Runs the tool and returns its result regardless of exit code.
    ///
    /// `cwd` defaults to the project directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::Spawn`] when the process cannot start.
    pub fn run_unchecked(
        &self,
        cmd: impl Into<CommandLine>,
        cwd: Option<&Path>,
    ) -> HarnessResult<CommandOutput> {
        let mut argv = Vec::with_capacity(16);
        argv.push(self.exe.as_os_str().to_os_string());
        argv.extend(cmd.into().flatten());
        let cwd = cwd.unwrap_or(&self.source_root);
        CommandOutput::capture(self.runner.as_ref(), argv, cwd)
    }

    /// Runs the tool and fails on a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::CommandFailed`] carrying the exit code,
    /// full argument vector and captured output when the tool exits non-zero,
    /// or [`crate::HarnessError::Spawn`] when it cannot start.
    pub fn run(&self, cmd: impl Into<CommandLine>, cwd: Option<&Path>) -> HarnessResult<CommandOutput> {
        self.run_unchecked(cmd, cwd)?.check()
    }

    // ------------------------------------------------------------------------
    // Command Assembly
    // ------------------------------------------------------------------------

    /// Assembles `build-deps` with extra trailing arguments.
    #[must_use]
    pub fn build_deps_cmd(&self, args: impl Into<CommandLine>, toolchain: Option<&str>) -> CommandLine {
        let extra: CommandLine = args.into();
        CommandLine::new()
            .arg("build-deps")
            .arg(Arg::flag_value("--toolchain", self.resolve_toolchain(toolchain)))
            .arg(self.catalog_arg())
            .arg(self.repo_dir_arg())
            .arg(Arg::flag_value("--out", self.deps_build_dir()))
            .arg(Arg::flag_value("--lmi-path", self.lmi_path()))
            .arg(extra)
    }

    /// Assembles `build`.
    #[must_use]
    pub fn build_cmd(&self, options: &BuildOptions) -> CommandLine {
        CommandLine::new()
            .arg("build")
            .arg(Arg::flag_value("--out", self.build_dir()))
            .arg(Arg::flag_value("--toolchain", self.resolve_toolchain(options.toolchain.as_deref())))
            .arg(self.catalog_arg())
            .arg(self.repo_dir_arg())
            .arg((!options.tests).then_some("--no-tests"))
            .arg((!options.apps).then_some("--no-apps"))
            .arg((!options.warnings).then_some("--no-warnings"))
            .arg(self.project_dir_arg())
    }

    /// Assembles `sdist create`.
    #[must_use]
    pub fn sdist_create_cmd(&self) -> CommandLine {
        CommandLine::new()
            .args(["sdist", "create"])
            .arg(self.project_dir_arg())
            .arg(Arg::flag_value("--out", self.created_sdist_path()))
    }

    /// Assembles `sdist export`.
    #[must_use]
    pub fn sdist_export_cmd(&self) -> CommandLine {
        CommandLine::new().args(["sdist", "export"]).arg(self.project_dir_arg()).arg(self.repo_dir_arg())
    }

    /// Assembles `catalog create`.
    #[must_use]
    pub fn catalog_create_cmd(&self) -> CommandLine {
        CommandLine::new().args(["catalog", "create"]).arg(self.catalog_arg())
    }

    /// Assembles `catalog import`.
    #[must_use]
    pub fn catalog_import_cmd(&self, json_path: &Path) -> CommandLine {
        CommandLine::new()
            .args(["catalog", "import"])
            .arg(self.catalog_arg())
            .arg(Arg::flag_value("--json", json_path))
    }

    /// Assembles `catalog get`.
    #[must_use]
    pub fn catalog_get_cmd(&self, req: &str) -> CommandLine {
        CommandLine::new().args(["catalog", "get"]).arg(self.catalog_arg()).arg(req)
    }

    /// Returns the archive path written by [`Dds::sdist_create`].
    #[must_use]
    pub fn created_sdist_path(&self) -> PathBuf {
        self.build_dir().join(CREATED_SDIST_NAME)
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Builds dependencies listed in `args` into the scratch workspace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::CommandFailed`] when dds exits non-zero.
    pub fn build_deps(
        &self,
        args: impl Into<CommandLine>,
        toolchain: Option<&str>,
    ) -> HarnessResult<CommandOutput> {
        self.run(self.build_deps_cmd(args, toolchain), None)
    }

    /// Builds the project.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::CommandFailed`] when dds exits non-zero.
    pub fn build(&self, options: &BuildOptions) -> HarnessResult<CommandOutput> {
        self.run(self.build_cmd(options), None)
    }

    /// Creates a source distribution archive in the build directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::CommandFailed`] when dds exits non-zero.
    pub fn sdist_create(&self) -> HarnessResult<CommandOutput> {
        self.run(self.sdist_create_cmd(), None)
    }

    /// Exports the project into the repository cache.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::CommandFailed`] when dds exits non-zero.
    pub fn sdist_export(&self) -> HarnessResult<CommandOutput> {
        self.run(self.sdist_export_cmd(), None)
    }

    /// Creates an empty catalog, running from the test directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::Workspace`] when the scratch directory
    /// cannot be created, or [`crate::HarnessError::CommandFailed`] when dds
    /// exits non-zero.
    pub fn catalog_create(&self) -> HarnessResult<CommandOutput> {
        self.workspace.ensure_exists()?;
        self.run(self.catalog_create_cmd(), Some(&self.test_dir))
    }

    /// Imports a JSON catalog description.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::Workspace`] when the scratch directory
    /// cannot be created, or [`crate::HarnessError::CommandFailed`] when dds
    /// exits non-zero.
    pub fn catalog_import(&self, json_path: &Path) -> HarnessResult<CommandOutput> {
        self.workspace.ensure_exists()?;
        self.run(self.catalog_import_cmd(json_path), None)
    }

    /// Looks up a requirement in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::CommandFailed`] when dds exits non-zero.
    pub fn catalog_get(&self, req: &str) -> HarnessResult<CommandOutput> {
        self.run(self.catalog_get_cmd(req), None)
    }

    /// Overrides a file under the project directory until the guard ends.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HarnessError::Workspace`] when the file cannot be
    /// read or written.
    pub fn set_contents(&self, path: impl AsRef<Path>, content: &[u8]) -> HarnessResult<ContentsGuard> {
        set_contents(self.source_root.join(path), content)
    }
}

impl std::fmt::Debug for Dds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dds")
            .field("exe", &self.exe)
            .field("test_dir", &self.test_dir)
            .field("source_root", &self.source_root)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
