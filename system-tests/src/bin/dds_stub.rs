// system-tests/src/bin/dds_stub.rs
// ============================================================================
// Module: dds Stand-In
// Description: Deterministic replacement for the dds executable.
// Purpose: Let system-tests exercise the harness without a C++ toolchain.
// Dependencies: clap, serde_json, system-tests, thiserror
// ============================================================================

//! ## Overview
//! Implements the subset of the dds CLI the harness drives: `build`,
//! `build-deps`, `sdist create|export`, and `catalog create|import|get`.
//! Flags use the same `--name=value` spelling as dds. Failures print a
//! message to stderr and exit with status 1; usage errors exit with clap's
//! status 2.
//!
//! "Compiling" a source means reading it: a source containing `#error`
//! fails the build, mirroring a compiler diagnostic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use system_tests::catalog::CatalogDb;
use system_tests::catalog::CatalogError;
use system_tests::catalog::Requirement;
use system_tests::project::BUILD_RECORD_NAME;
use system_tests::project::BuildRecord;
use system_tests::project::MANIFEST_NAME;
use system_tests::project::PackageManifest;
use system_tests::project::SdistArchive;
use system_tests::project::SourceKind;
use system_tests::project::collect_files;
use system_tests::project::collect_sources;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory name never packaged into source distributions.
const SCRATCH_DIR_NAME: &str = "_test_scratch";
/// Marker that makes a source fail to compile.
const COMPILE_ERROR_MARKER: &str = "#error";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "dds", disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the project.
    Build(BuildCommand),
    /// Build dependencies named on the command line.
    BuildDeps(BuildDepsCommand),
    /// Source distribution utilities.
    Sdist {
        /// Selected sdist subcommand.
        #[command(subcommand)]
        command: SdistCommand,
    },
    /// Package catalog utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

/// Arguments for `build`.
#[derive(Args, Debug)]
struct BuildCommand {
    /// Build output directory.
    #[arg(long, value_name = "DIR")]
    out: PathBuf,
    /// Toolchain identifier or file.
    #[arg(long, value_name = "TOOLCHAIN")]
    toolchain: String,
    /// Catalog database.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Repository cache directory.
    #[arg(long, value_name = "DIR")]
    repo_dir: PathBuf,
    /// Project directory.
    #[arg(long, value_name = "DIR")]
    project_dir: PathBuf,
    /// Skip tests.
    #[arg(long, action = ArgAction::SetTrue)]
    no_tests: bool,
    /// Skip applications.
    #[arg(long, action = ArgAction::SetTrue)]
    no_apps: bool,
    /// Disable warnings.
    #[arg(long, action = ArgAction::SetTrue)]
    no_warnings: bool,
}

/// Arguments for `build-deps`.
#[derive(Args, Debug)]
struct BuildDepsCommand {
    /// Toolchain identifier or file.
    #[arg(long, value_name = "TOOLCHAIN")]
    toolchain: String,
    /// Catalog database.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Repository cache directory.
    #[arg(long, value_name = "DIR")]
    repo_dir: PathBuf,
    /// Dependency build output directory.
    #[arg(long, value_name = "DIR")]
    out: PathBuf,
    /// Generated library index file.
    #[arg(long, value_name = "PATH")]
    lmi_path: PathBuf,
    /// Requirements to build, as `name@version`.
    #[arg(value_name = "REQ")]
    deps: Vec<String>,
}

/// Sdist subcommands.
#[derive(Subcommand, Debug)]
enum SdistCommand {
    /// Create a source distribution archive.
    Create {
        /// Project directory.
        #[arg(long, value_name = "DIR")]
        project_dir: PathBuf,
        /// Archive path.
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
    /// Export the project into a repository cache.
    Export {
        /// Project directory.
        #[arg(long, value_name = "DIR")]
        project_dir: PathBuf,
        /// Repository cache directory.
        #[arg(long, value_name = "DIR")]
        repo_dir: PathBuf,
    },
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Create an empty catalog database.
    Create {
        /// Catalog database.
        #[arg(long, value_name = "PATH")]
        catalog: PathBuf,
    },
    /// Import packages from a JSON document.
    Import {
        /// Catalog database.
        #[arg(long, value_name = "PATH")]
        catalog: PathBuf,
        /// JSON document to import.
        #[arg(long, value_name = "PATH")]
        json: PathBuf,
    },
    /// Look up one package requirement.
    Get {
        /// Catalog database.
        #[arg(long, value_name = "PATH")]
        catalog: PathBuf,
        /// Requirement as `name@version`.
        #[arg(value_name = "REQ")]
        requirement: String,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures reported by the stand-in.
#[derive(Debug, Error)]
enum StubError {
    /// Catalog or project data error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Toolchain argument is not recognized.
    #[error("invalid toolchain \"{0}\": expected a builtin (:...) or an existing file")]
    InvalidToolchain(String),
    /// A source file failed to compile.
    #[error("compilation failed: {0}")]
    Compile(String),
    /// Filesystem operation failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// Attempted operation.
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

/// Result alias for stand-in commands.
type StubResult<T> = Result<T, StubError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Entry point returning an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Dispatches the selected subcommand.
fn run(command: Commands) -> StubResult<()> {
    match command {
        Commands::Build(command) => command_build(&command),
        Commands::BuildDeps(command) => command_build_deps(&command),
        Commands::Sdist {
            command,
        } => command_sdist(command),
        Commands::Catalog {
            command,
        } => command_catalog(command),
    }
}

// ============================================================================
// SECTION: Build
// ============================================================================

/// Executes `build`.
fn command_build(command: &BuildCommand) -> StubResult<()> {
    validate_toolchain(&command.toolchain)?;
    CatalogDb::load_or_default(&command.catalog)?;
    create_dir(&command.repo_dir)?;
    let manifest = PackageManifest::load(&command.project_dir)?;
    let mut compiled = Vec::new();
    for source in collect_sources(&command.project_dir)? {
        let selected = match source.kind {
            SourceKind::Library => true,
            SourceKind::App => !command.no_apps,
            SourceKind::Test => !command.no_tests,
        };
        if !selected {
            continue;
        }
        let text = fs::read_to_string(&source.path).map_err(|err| io_error("read", &source.path, err))?;
        if text.contains(COMPILE_ERROR_MARKER) {
            return Err(StubError::Compile(source.relative));
        }
        compiled.push(source.relative);
    }
    create_dir(&command.out)?;
    let record = BuildRecord {
        package: manifest.ident(),
        toolchain: command.toolchain.clone(),
        warnings: !command.no_warnings,
        compiled,
    };
    write_json(&command.out.join(BUILD_RECORD_NAME), &record)?;
    write_stdout_line(&format!("built {} ({} sources)", record.package, record.compiled.len()))
}

/// Executes `build-deps`.
fn command_build_deps(command: &BuildDepsCommand) -> StubResult<()> {
    validate_toolchain(&command.toolchain)?;
    let catalog = CatalogDb::load(&command.catalog)?;
    create_dir(&command.repo_dir)?;
    let mut index = String::from("Type: Index\n");
    for raw in &command.deps {
        let req = Requirement::parse(raw)?;
        catalog.get(&req)?;
        create_dir(&command.out.join(req.to_string()))?;
        index.push_str(&format!("Package: {}; {req}/{}.lmp\n", req.name, req.name));
    }
    create_dir(&command.out)?;
    if let Some(parent) = command.lmi_path.parent() {
        create_dir(parent)?;
    }
    fs::write(&command.lmi_path, index).map_err(|err| io_error("write", &command.lmi_path, err))?;
    write_stdout_line(&format!("built {} dependencies", command.deps.len()))
}

/// Accepts builtin identifiers (`:...`) and existing toolchain files.
fn validate_toolchain(toolchain: &str) -> StubResult<()> {
    let builtin = toolchain.strip_prefix(':').is_some_and(|rest| !rest.is_empty());
    if builtin || Path::new(toolchain).is_file() {
        Ok(())
    } else {
        Err(StubError::InvalidToolchain(toolchain.to_string()))
    }
}

// ============================================================================
// SECTION: Sdist
// ============================================================================

/// Executes `sdist` subcommands.
fn command_sdist(command: SdistCommand) -> StubResult<()> {
    match command {
        SdistCommand::Create {
            project_dir,
            out,
        } => {
            let manifest = PackageManifest::load(&project_dir)?;
            let archive = SdistArchive {
                package: manifest.ident(),
                files: collect_files(&project_dir, SCRATCH_DIR_NAME)?,
            };
            if let Some(parent) = out.parent() {
                create_dir(parent)?;
            }
            write_json(&out, &archive)?;
            write_stdout_line(&format!("created {}", out.display()))
        }
        SdistCommand::Export {
            project_dir,
            repo_dir,
        } => {
            let manifest = PackageManifest::load(&project_dir)?;
            let dest = repo_dir.join(manifest.ident());
            create_dir(&dest)?;
            let source = project_dir.join(MANIFEST_NAME);
            let target = dest.join(MANIFEST_NAME);
            fs::copy(&source, &target).map_err(|err| io_error("copy", &source, err))?;
            write_stdout_line(&format!("exported {}", manifest.ident()))
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Executes `catalog` subcommands.
fn command_catalog(command: CatalogCommand) -> StubResult<()> {
    match command {
        CatalogCommand::Create {
            catalog,
        } => {
            if !catalog.exists() {
                CatalogDb::default().save(&catalog)?;
            }
            write_stdout_line(&format!("catalog ready at {}", catalog.display()))
        }
        CatalogCommand::Import {
            catalog,
            json,
        } => {
            let mut db = CatalogDb::load_or_default(&catalog)?;
            let imported = db.import(&json)?;
            db.save(&catalog)?;
            write_stdout_line(&format!("imported {imported} package versions"))
        }
        CatalogCommand::Get {
            catalog,
            requirement,
        } => {
            let db = CatalogDb::load(&catalog)?;
            let req = Requirement::parse(&requirement)?;
            let entry = db.get(&req)?;
            let rendered = serde_json::to_string(entry)
                .map_err(|err| StubError::Output(io::Error::other(err)))?;
            write_stdout_line(&format!("{req} {rendered}"))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Creates a directory and its parents.
fn create_dir(path: &Path) -> StubResult<()> {
    fs::create_dir_all(path).map_err(|err| io_error("create", path, err))
}

/// Writes pretty JSON to `path`.
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> StubResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|err| StubError::Output(io::Error::other(err)))?;
    fs::write(path, bytes).map_err(|err| io_error("write", path, err))
}

/// Builds an I/O error value.
fn io_error(action: &'static str, path: &Path, source: io::Error) -> StubError {
    StubError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> StubResult<()> {
    let mut stdout = io::stdout();
    writeln!(&mut stdout, "{message}").map_err(StubError::Output)
}

/// Writes an error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = io::stderr();
    let _ = writeln!(&mut stderr, "dds: {message}");
    ExitCode::FAILURE
}
