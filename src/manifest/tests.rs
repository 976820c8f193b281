use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use predicates::prelude::*;
use tempfile::TempDir;

use super::*;
use crate::error::SweepError;

/// Create `<root>/project/venv` and return (environment, owner).
fn make_project(root: &Path) -> (PathBuf, PathBuf) {
    let owner = root.join("project");
    let env = owner.join("venv");
    fs::create_dir_all(&env).unwrap();
    (env, owner)
}

/// Install a shell script posing as the environment's interpreter.
#[cfg(unix)]
fn fake_interpreter(env: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let bin = env.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let python = bin.join("python");
    fs::write(&python, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_locate_interpreter_windows_layout() {
    let temp_dir = TempDir::new().unwrap();
    let (env, _) = make_project(temp_dir.path());
    fs::create_dir_all(env.join("Scripts")).unwrap();
    fs::write(env.join("Scripts/python.exe"), "mock python").unwrap();

    assert_eq!(
        locate_interpreter(&env),
        Some(env.join("Scripts").join("python.exe"))
    );
}

#[test]
fn test_locate_interpreter_prefers_windows_layout() {
    let temp_dir = TempDir::new().unwrap();
    let (env, _) = make_project(temp_dir.path());
    fs::create_dir_all(env.join("Scripts")).unwrap();
    fs::create_dir_all(env.join("bin")).unwrap();
    fs::write(env.join("Scripts/python.exe"), "").unwrap();
    fs::write(env.join("bin/python"), "").unwrap();

    assert_eq!(
        locate_interpreter(&env),
        Some(env.join("Scripts").join("python.exe"))
    );
}

#[test]
fn test_locate_interpreter_posix_layout() {
    let temp_dir = TempDir::new().unwrap();
    let (env, _) = make_project(temp_dir.path());
    fs::create_dir_all(env.join("bin")).unwrap();
    fs::write(env.join("bin/python"), "").unwrap();

    assert_eq!(locate_interpreter(&env), Some(env.join("bin").join("python")));
}

#[test]
fn test_locate_interpreter_ignores_directories() {
    let temp_dir = TempDir::new().unwrap();
    let (env, _) = make_project(temp_dir.path());
    fs::create_dir_all(env.join("bin/python")).unwrap();

    assert_eq!(locate_interpreter(&env), None);
    assert_eq!(locate_interpreter(&temp_dir.path().join("missing")), None);
}

#[test]
fn test_generate_rejects_blank_paths() {
    let result = generate(Path::new(""), Path::new("out.txt"), false);
    assert!(matches!(
        result,
        Err(SweepError::EmptyPath {
            argument: "environment_path"
        })
    ));

    let result = generate(Path::new("venv"), Path::new("   "), false);
    assert!(matches!(
        result,
        Err(SweepError::EmptyPath {
            argument: "output_path"
        })
    ));
}

#[test]
fn test_generate_missing_environment() {
    let temp_dir = TempDir::new().unwrap();
    let outcome = generate(
        &temp_dir.path().join("nonexistent_venv"),
        &temp_dir.path().join("out.txt"),
        false,
    )
    .unwrap();

    assert!(!outcome.success);
    assert!(predicate::str::contains("does not exist").eval(&outcome.message));
}

#[test]
fn test_generate_environment_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("venv");
    fs::write(&file, "").unwrap();

    let outcome = generate(&file, &temp_dir.path().join("out.txt"), false).unwrap();
    assert!(!outcome.success);
    assert!(predicate::str::contains("not a directory").eval(&outcome.message));
}

#[test]
fn test_generate_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    let output = owner.join(MANIFEST_FILE_NAME);
    fs::write(&output, "hand-curated==1.0\n").unwrap();

    let outcome = generate(&env, &output, false).unwrap();

    assert!(!outcome.success);
    assert!(predicate::str::contains("already exists").eval(&outcome.message));
    assert_eq!(fs::read_to_string(&output).unwrap(), "hand-curated==1.0\n");
}

#[test]
fn test_generate_without_interpreter() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());

    let outcome = generate(&env, &owner.join(MANIFEST_FILE_NAME), false).unwrap();

    assert!(!outcome.success);
    assert!(predicate::str::contains("Could not find Python executable").eval(&outcome.message));
}

#[cfg(unix)]
#[test]
fn test_generate_writes_freeze_output_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    fake_interpreter(
        &env,
        "printf '# editable installs\\nrequests==2.31.0\\n\\nurllib3==2.2.1\\nZope.Interface==6.0\\n'",
    );
    let output = owner.join(MANIFEST_FILE_NAME);

    let outcome = generate(&env, &output, false).unwrap();

    assert!(outcome.success, "{}", outcome.message);
    assert!(predicate::str::contains("with 3 packages").eval(&outcome.message));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "# editable installs\nrequests==2.31.0\n\nurllib3==2.2.1\nZope.Interface==6.0\n"
    );
}

#[cfg(unix)]
#[test]
fn test_generate_overwrites_when_asked() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    fake_interpreter(&env, "echo 'numpy==1.26.4'");
    let output = owner.join(MANIFEST_FILE_NAME);
    fs::write(&output, "stale==0.1\n").unwrap();

    let outcome = generate(&env, &output, true).unwrap();

    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(fs::read_to_string(&output).unwrap(), "numpy==1.26.4\n");
}

#[cfg(unix)]
#[test]
fn test_generate_reports_failing_pip() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    fake_interpreter(&env, "echo 'No module named pip' >&2\nexit 1");
    let output = owner.join(MANIFEST_FILE_NAME);

    let outcome = generate(&env, &output, false).unwrap();

    assert!(!outcome.success);
    assert!(predicate::str::contains("pip freeze failed").eval(&outcome.message));
    assert!(predicate::str::contains("No module named pip").eval(&outcome.message));
    assert!(!output.exists());
}

#[cfg(unix)]
#[test]
fn test_generate_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    fake_interpreter(&env, "exec sleep 10");
    let output = owner.join(MANIFEST_FILE_NAME);

    let outcome = ManifestGenerator::new()
        .timeout(Duration::from_millis(200))
        .generate(&env, &output, false)
        .unwrap();

    assert!(!outcome.success);
    assert!(predicate::str::contains("timed out").eval(&outcome.message));
    assert!(!output.exists());
}

#[test]
fn test_generate_batch_empty() {
    let report = generate_batch(&[], false);
    assert_eq!(report, BatchReport::new());
}

#[test]
fn test_generate_batch_missing_owner() {
    let temp_dir = TempDir::new().unwrap();
    let (env, _) = make_project(temp_dir.path());
    let targets = [ManifestTarget {
        environment_path: Some(env.clone()),
        owner_path: None,
    }];

    let report = generate_batch(&targets, false);

    assert_eq!(report.total, 1);
    assert_eq!(report.successful, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.results[0].subject_path, env);
    assert!(predicate::str::contains("Missing").eval(&report.results[0].message));
}

#[test]
fn test_generate_batch_continues_past_failures() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    let targets = [
        ManifestTarget::default(),
        ManifestTarget::new(temp_dir.path().join("gone/venv"), temp_dir.path().join("gone")),
        ManifestTarget::new(&env, &owner),
    ];

    let report = generate_batch(&targets, false);

    assert_eq!(report.total, 3);
    assert_eq!(report.failed + report.successful, 3);
    assert_eq!(report.results[2].subject_path, env);
    // No interpreter in the fixture, so the last item fails too.
    assert_eq!(report.failed, 3);
}

#[cfg(unix)]
#[test]
fn test_generate_batch_writes_into_owner() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    fake_interpreter(&env, "echo 'flask==3.0.0'");

    let report = generate_batch(&[ManifestTarget::new(&env, &owner)], false);

    assert_eq!(report.successful, 1);
    assert_eq!(
        fs::read_to_string(owner.join(MANIFEST_FILE_NAME)).unwrap(),
        "flask==3.0.0\n"
    );
}

#[test]
fn test_count_packages() {
    assert_eq!(count_packages(""), 0);
    assert_eq!(count_packages("a==1\n# comment\n   \nb==2"), 2);
}

#[cfg(unix)]
#[test]
fn test_timeout_covers_output_held_open_by_descendant() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    // The interpreter exits at once but a background child keeps stdout open.
    fake_interpreter(&env, "sleep 5 &\necho 'a==1'");
    let output = owner.join(MANIFEST_FILE_NAME);

    let started = std::time::Instant::now();
    let outcome = ManifestGenerator::new()
        .timeout(Duration::from_millis(300))
        .generate(&env, &output, false)
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!outcome.success);
    assert!(predicate::str::contains("timed out").eval(&outcome.message));
    assert!(!output.exists());
}

#[cfg(unix)]
#[test]
fn test_generate_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    fake_interpreter(&env, "echo 'numpy==1.26.4'");
    let output = owner.join(MANIFEST_FILE_NAME);
    fs::write(&output, "hand-curated==9.9\n").unwrap();

    let outcome = ManifestGenerator::new()
        .dry_run(true)
        .generate(&env, &output, true)
        .unwrap();

    assert!(outcome.success, "{}", outcome.message);
    assert!(outcome.message.starts_with("[DRY RUN] Would write:"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "hand-curated==9.9\n");

    let fresh = owner.join("other.txt");
    let outcome = ManifestGenerator::new()
        .dry_run(true)
        .generate(&env, &fresh, false)
        .unwrap();
    assert!(outcome.success);
    assert!(!fresh.exists());
}

#[test]
fn test_generate_dry_run_still_checks_interpreter() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());

    let outcome = ManifestGenerator::new()
        .dry_run(true)
        .generate(&env, &owner.join(MANIFEST_FILE_NAME), true)
        .unwrap();

    assert!(!outcome.success);
    assert!(predicate::str::contains("Could not find Python executable").eval(&outcome.message));
}

#[cfg(unix)]
#[test]
fn test_generate_reports_write_failure() {
    let temp_dir = TempDir::new().unwrap();
    let (env, owner) = make_project(temp_dir.path());
    fake_interpreter(&env, "echo 'numpy==1.26.4'");
    let output = owner.join("missing-dir").join(MANIFEST_FILE_NAME);

    let outcome = generate(&env, &output, false).unwrap();

    assert!(!outcome.success);
    assert!(predicate::str::contains("Error generating requirements").eval(&outcome.message));
    assert!(!output.exists());
}
