//! Integration tests for doctrans

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[cfg(unix)]
const EXECUTABLE_NAME: &str = "doctrans";

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "doctrans.exe";

fn fixture_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("doctrans.toml")
}

/// Command isolated from the user's config, log file and engine settings
fn doctrans_cmd(config: &Path, home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("doctrans");
    cmd.env("DOCTRANS_CONFIG", config)
        .env("HOME", home)
        .env_remove("DOCTRANS_LOG");
    cmd
}

/// Writable copy of the fixture config inside a fresh temp dir
fn scratch() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("doctrans.toml");
    fs::copy(fixture_config_path(), &config).expect("copy fixture");
    (dir, config)
}

#[test]
fn test_version() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("doctrans"));
}

#[test]
fn test_help() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("translates office documents"));
}

#[test]
fn test_invalid_command() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .arg("invalid")
        .assert()
        .failure();
}

#[test]
fn test_translate_help() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["translate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Usage: {} translate",
            EXECUTABLE_NAME
        )))
        .stdout(predicate::str::contains("--target-lang"));
}

#[test]
fn test_config_show() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"))
        .stdout(predicate::str::contains("timeout-secs: 30"));
}

#[test]
fn test_config_defaults_to_show() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:"));
}

#[test]
fn test_config_path() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("doctrans.toml"));
}

#[test]
fn test_config_set_persists() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["config", "set", "timeout-secs", "45"])
        .assert()
        .success();

    doctrans_cmd(&config, dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout-secs: 45"));
}

#[test]
fn test_config_set_unknown_key() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["config", "set", "no-such-key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_config_set_invalid_timeout() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["config", "set", "timeout-secs", "soon"])
        .assert()
        .failure();
}

#[test]
fn test_engine_set_then_show() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args([
            "engine",
            "set",
            "local",
            "--api-url",
            "http://localhost:8080/v1",
            "--model",
            "mistral-small",
            "--temperature",
            "0.5",
        ])
        .assert()
        .success();

    assert!(dir.path().join("engines").join("local.json").is_file());

    doctrans_cmd(&config, dir.path())
        .args(["engine", "show", "local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mistral-small"))
        .stdout(predicate::str::contains("http://localhost:8080/v1"));

    doctrans_cmd(&config, dir.path())
        .args(["engine", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local"));
}

#[test]
fn test_engine_show_builtin_defaults() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["engine", "show", "deepseek"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deepseek-chat"));
}

#[test]
fn test_engine_rejects_bad_temperature() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["engine", "set", "openai", "--temperature", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid temperature"));
}

#[test]
fn test_engine_rejects_bad_name() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["engine", "show", "../escape"])
        .assert()
        .failure();
}

#[test]
fn test_translate_missing_input() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args([
            "translate",
            "missing.docx",
            "--target-lang",
            "French",
            "--target-code",
            "fr",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_translate_without_runtime() {
    let (dir, config) = scratch();
    let input = dir.path().join("memo.docx");
    fs::write(&input, b"not really a document").expect("write input");

    doctrans_cmd(&config, dir.path())
        .arg("translate")
        .arg(&input)
        .args(["--target-lang", "French", "--target-code", "fr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No compatible Python runtime found"));
}

#[test]
fn test_runtime_without_candidates() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .arg("runtime")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No compatible Python runtime found"))
        .stderr(predicate::str::contains("/nonexistent/doctrans/python3"));
}

#[test]
fn test_connection_without_runtime() {
    let (dir, config) = scratch();
    doctrans_cmd(&config, dir.path())
        .args(["test-connection", "--engine", "openai"])
        .assert()
        .failure();
}
