// system-tests/tests/suites/sdist.rs
// ============================================================================
// Module: Sdist Tests
// Description: End-to-end coverage of `sdist create` and `sdist export`.
// Purpose: Validate archive placement and repository export.
// Dependencies: system-tests helpers, dds-harness
// ============================================================================

//! Source distribution coverage for dds system-tests.

use std::fs;

use dds_harness::HarnessError;
use helpers::artifacts::TestReporter;
use helpers::projects::SIMPLE_SOURCES;
use helpers::projects::StagedTests;
use helpers::stub;
use system_tests::project::SdistArchive;

use crate::helpers;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn sdist_create_writes_the_archive_into_the_build_dir() -> TestResult {
    let mut reporter = TestReporter::new("sdist_create_writes_the_archive_into_the_build_dir")?;
    let staged = StagedTests::new()?;
    let project = staged.project("simple", "simple", "0.1.0", SIMPLE_SOURCES)?;
    let fixture = stub::fixture(staged.path())?;

    fixture.with_dds(&project, |dds| {
        let output = dds.sdist_create()?;
        let archive = dds.created_sdist_path();
        assert!(archive.is_file());
        assert!(archive.starts_with(dds.scratch_dir()));
        reporter.record(&output);
        if stub::using_stub(&fixture) {
            let bytes =
                fs::read(&archive).map_err(|err| HarnessError::Fixture(err.to_string()))?;
            let sdist: SdistArchive = serde_json::from_slice(&bytes)
                .map_err(|err| HarnessError::Fixture(err.to_string()))?;
            assert_eq!(sdist.package, "simple@0.1.0");
            assert!(sdist.files.iter().any(|file| file == "package.json5"));
            assert!(sdist.files.iter().all(|file| !file.starts_with("_test_scratch")));
        }
        Ok(())
    })?;

    reporter.finish("pass", Vec::new())?;
    Ok(())
}

#[test]
fn sdist_export_populates_the_repo_dir() -> TestResult {
    let mut reporter = TestReporter::new("sdist_export_populates_the_repo_dir")?;
    let staged = StagedTests::new()?;
    let project = staged.project("simple", "simple", "0.1.0", SIMPLE_SOURCES)?;
    let fixture = stub::fixture(staged.path())?;

    fixture.with_dds(&project, |dds| {
        let output = dds.sdist_export()?;
        assert!(output.argv_strings().iter().any(|arg| arg.starts_with("--repo-dir=")));
        assert!(dds.repo_dir().is_dir());
        if stub::using_stub(&fixture) {
            assert!(dds.repo_dir().join("simple@0.1.0").join("package.json5").is_file());
        }
        reporter.record(&output);
        Ok(())
    })?;

    assert!(!project.join("_test_scratch").exists());
    reporter.finish("pass", Vec::new())?;
    Ok(())
}
