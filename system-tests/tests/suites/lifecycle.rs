// system-tests/tests/suites/lifecycle.rs
// ============================================================================
// Module: Lifecycle Tests
// Description: Scratch cleanup and parametrization against a real process.
// Purpose: Validate that scopes remove scratch state on every exit path.
// Dependencies: system-tests helpers, dds-harness
// ============================================================================

//! Harness lifecycle coverage for dds system-tests.

use std::path::PathBuf;

use dds_harness::BuildOptions;
use dds_harness::Fixture;
use dds_harness::FixtureParams;
use dds_harness::HarnessError;
use dds_harness::Scope;
use dds_harness::fixture_conf;
use dds_harness::fixture_conf_1;
use dds_harness::scoped_dds;
use helpers::artifacts::TestReporter;
use helpers::projects::SIMPLE_SOURCES;
use helpers::projects::StagedTests;
use helpers::stub;

use crate::helpers;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn scratch_is_removed_after_a_successful_build() -> TestResult {
    let mut reporter = TestReporter::new("scratch_is_removed_after_a_successful_build")?;
    let staged = StagedTests::new()?;
    let project = staged.project("simple", "simple", "0.1.0", SIMPLE_SOURCES)?;
    let fixture = stub::fixture(staged.path())?;

    let scratch = fixture.with_dds(&project, |dds| {
        reporter.record(&dds.build(&BuildOptions::default())?);
        assert!(dds.build_dir().is_dir());
        Ok(dds.scratch_dir().to_path_buf())
    })?;

    assert_eq!(scratch, project.join("_test_scratch"));
    assert!(!scratch.exists());
    reporter.finish("pass", Vec::new())?;
    Ok(())
}

#[test]
fn shared_scope_cleans_every_harness() -> TestResult {
    let mut reporter = TestReporter::new("shared_scope_cleans_every_harness")?;
    let staged = StagedTests::new()?;
    let first = staged.project("first", "first", "1.0.0", SIMPLE_SOURCES)?;
    let second = staged.project("second", "second", "2.0.0", SIMPLE_SOURCES)?;
    let fixture = stub::fixture(staged.path())?;

    let mut scope = Scope::new();
    let a = fixture.dds(&first, &mut scope)?;
    let b = fixture.dds(&second, &mut scope)?;
    assert_eq!(scope.pending(), 2);
    reporter.record(&a.build(&BuildOptions::default())?);
    reporter.record(&b.build(&BuildOptions::default())?);
    assert!(a.scratch_dir().exists());
    assert!(b.scratch_dir().exists());
    drop((a, b));
    scope.close()?;

    assert!(!first.join("_test_scratch").exists());
    assert!(!second.join("_test_scratch").exists());
    reporter.finish("pass", Vec::new())?;
    Ok(())
}

#[test]
fn each_variant_gets_its_own_harness() -> TestResult {
    let mut reporter = TestReporter::new("each_variant_gets_its_own_harness")?;
    let staged = StagedTests::new()?;
    staged.project("alpha", "alpha", "0.1.0", SIMPLE_SOURCES)?;
    staged.project("beta", "beta", "0.2.0", SIMPLE_SOURCES)?;
    let fixture = stub::fixture(staged.path())?;

    let set = fixture_conf([FixtureParams::new("alpha", "alpha"), FixtureParams::new("beta", "beta")]);
    assert_eq!(set.ids(), ["alpha", "beta"]);
    let mut seen = Vec::new();
    set.run(&fixture, |params, dds| {
        assert_eq!(dds.source_root(), staged.path().join(&params.subdir));
        reporter.record(&dds.build(&BuildOptions::default())?);
        seen.push(params.ident.clone());
        Ok(())
    })?;

    assert_eq!(seen, ["alpha", "beta"]);
    assert!(!staged.path().join("alpha/_test_scratch").exists());
    assert!(!staged.path().join("beta/_test_scratch").exists());
    reporter.finish("pass", Vec::new())?;
    Ok(())
}

#[test]
fn single_variant_runs_once() -> TestResult {
    let mut reporter = TestReporter::new("single_variant_runs_once")?;
    let staged = StagedTests::new()?;
    staged.project("simple", "simple", "0.1.0", SIMPLE_SOURCES)?;
    let fixture = stub::fixture(staged.path())?;

    let set = fixture_conf_1("simple");
    assert_eq!(set.ids(), ["."]);
    let mut runs = 0;
    set.run(&fixture, |_, dds| {
        reporter.record(&dds.sdist_create()?);
        runs += 1;
        Ok(())
    })?;

    assert_eq!(runs, 1);
    reporter.finish("pass", Vec::new())?;
    Ok(())
}

#[test]
fn missing_executable_is_a_spawn_error_and_still_cleans_up() -> TestResult {
    let mut reporter = TestReporter::new("missing_executable_is_a_spawn_error_and_still_cleans_up")?;
    let staged = StagedTests::new()?;
    let project = staged.project("simple", "simple", "0.1.0", SIMPLE_SOURCES)?;
    let missing: PathBuf = staged.path().join("no-such-dds");

    let result = scoped_dds(&missing, staged.path(), &project, |dds| {
        dds.catalog_create().map(|_| ())
    });

    assert!(matches!(result, Err(HarnessError::Spawn { .. })));
    assert!(!project.join("_test_scratch").exists());
    let err = Fixture::from_config(
        &dds_harness::HarnessConfig {
            exe: Some(missing),
            ..dds_harness::HarnessConfig::default()
        },
        staged.path(),
        staged.path(),
    )
    .err();
    assert!(matches!(err, Some(HarnessError::Fixture(_))));
    reporter.finish("pass", Vec::new())?;
    Ok(())
}
