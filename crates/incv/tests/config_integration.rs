//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// A temp project bounded by `.git` with a `package.json` at version 1.2.3.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join(".git")).unwrap();
    fs::write(tmp.path().join("package.json"), r#"{"version":"1.2.3"}"#).unwrap();
    tmp
}

fn dry_run_in(dir: &Path) -> Command {
    let mut cmd = cmd();
    cmd.arg("-C").arg(dir).arg("--dry").env_remove("RUST_LOG");
    cmd
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = project();

    dry_run_in(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.4"));
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = project();
    fs::write(
        tmp.path().join(".incv.toml"),
        "[tags]\nminor = \"feat:\"\n",
    )
    .unwrap();

    dry_run_in(tmp.path())
        .args(["-c", "feat: add thing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.3.0"));
}

#[test]
fn discovers_regular_config_in_current_dir() {
    let tmp = project();
    fs::write(
        tmp.path().join("incv.toml"),
        "[tokens]\nprerelease = \"beta\"\n",
    )
    .unwrap();

    dry_run_in(tmp.path())
        .args(["--no-patch", "--prerelease"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.3-beta.0"));
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = project();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(
        tmp.path().join(".incv.toml"),
        "manifest = \"../../package.json\"\n",
    )
    .unwrap();

    dry_run_in(&sub_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.4"));
}

#[test]
fn yaml_config_is_supported() {
    let tmp = project();
    fs::write(
        tmp.path().join(".incv.yaml"),
        "tokens:\n  build: ci\n",
    )
    .unwrap();

    dry_run_in(tmp.path())
        .args(["--no-patch", "--build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.3+ci.0"));
}

#[test]
fn json_config_is_supported() {
    let tmp = project();
    fs::write(
        tmp.path().join(".incv.json"),
        r#"{"tags": {"major": "!"}}"#,
    )
    .unwrap();

    dry_run_in(tmp.path())
        .args(["-c", "feat!: drop node 16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 2.0.0"));
}

#[test]
fn config_manifest_is_used() {
    let tmp = project();
    fs::write(tmp.path().join("app.json"), r#"{"version":"0.1.0"}"#).unwrap();
    fs::write(tmp.path().join(".incv.toml"), "manifest = \"app.json\"\n").unwrap();

    dry_run_in(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0 -> 0.1.1"));
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn cli_flags_override_config() {
    let tmp = project();
    fs::write(
        tmp.path().join(".incv.toml"),
        "[tokens]\nprerelease = \"beta\"\n",
    )
    .unwrap();

    dry_run_in(tmp.path())
        .args(["--no-patch", "--prerelease", "--prerelease-token", "rc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.3-rc.0"));
}

#[test]
fn cli_empty_token_policy_overrides_config() {
    let tmp = project();
    fs::write(tmp.path().join(".incv.toml"), "empty_token = \"reject\"\n").unwrap();

    dry_run_in(tmp.path())
        .args(["--build"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("fatal:"));

    dry_run_in(tmp.path())
        .args(["--build", "--empty-token", "omit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.4+0"));
}

#[test]
fn explicit_config_overrides_discovered() {
    let tmp = project();
    fs::write(
        tmp.path().join(".incv.toml"),
        "[tokens]\nprerelease = \"alpha\"\n",
    )
    .unwrap();

    let explicit = tmp.path().join("release.toml");
    fs::write(&explicit, "[tokens]\nprerelease = \"rc\"\n").unwrap();

    dry_run_in(tmp.path())
        .arg("--config")
        .arg(&explicit)
        .args(["--no-patch", "--prerelease"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.3-rc.0"));
}

#[test]
fn invalid_config_is_fatal() {
    let tmp = project();
    fs::write(tmp.path().join(".incv.toml"), "empty_token = \"maybe\"\n").unwrap();

    dry_run_in(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("fatal: failed to load configuration"));
}

#[test]
fn boundary_marker_stops_discovery() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::write(repo.join("package.json"), r#"{"version":"1.2.3"}"#).unwrap();
    // outside the repo, must not be picked up
    fs::write(tmp.path().join(".incv.toml"), "manifest = \"missing.json\"\n").unwrap();

    dry_run_in(&repo)
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.4"));
}

// =============================================================================
// Logging
// =============================================================================

#[test]
fn log_dir_env_writes_jsonl_file() {
    let tmp = project();
    let log_dir = tmp.path().join("logs");

    dry_run_in(tmp.path())
        .arg("-v")
        .env("INCV_LOG_DIR", &log_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 -> 1.2.4"));

    let log = fs::read_to_string(log_dir.join("incv.jsonl")).unwrap();
    let first = log.lines().next().expect("at least one log line");
    let entry: serde_json::Value = serde_json::from_str(first).unwrap();
    assert!(entry.get("level").is_some());
}

#[test]
fn fatal_error_is_logged_to_file() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join(".git")).unwrap();
    let log_dir = tmp.path().join("logs");

    dry_run_in(tmp.path())
        .env("INCV_LOG_DIR", &log_dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("fatal: Could not read package.json file."));

    let log = fs::read_to_string(log_dir.join("incv.jsonl")).unwrap();
    assert!(log.contains("fatal error"), "log: {log}");
    assert!(log.contains("ERROR"), "log: {log}");
}

#[test]
fn logs_never_reach_stdout() {
    let tmp = project();

    dry_run_in(tmp.path())
        .args(["-vv", "-q"])
        .assert()
        .success()
        .stdout("1.2.3 -> 1.2.4\n");
}
