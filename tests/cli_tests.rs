//! CLI integration tests
//!
//! Runs the built signal-server binary for the commands that need no network.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_signal(args: &[&str], working_dir: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_signal-server"));
    cmd.args(args).arg("--no-color");
    cmd.env_remove("RUST_LOG");
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    cmd.output().expect("Failed to execute signal-server")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_help_command() {
    let output = run_signal(&["--help"], None);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Signal"));
    assert!(text.contains("init"));
    assert!(text.contains("config"));
    assert!(text.contains("run"));
}

#[test]
fn test_version_command() {
    let output = run_signal(&["--version"], None);
    assert!(output.status.success());
    assert!(stdout(&output).contains("signal-server"));
}

#[test]
fn test_init_creates_project_files() {
    let dir = TempDir::new().unwrap();
    let output = run_signal(&["init"], Some(dir.path()));
    assert!(output.status.success());

    assert!(dir.path().join("signal.toml").exists());
    assert!(dir.path().join(".env.example").exists());
    assert!(dir.path().join("data").is_dir());
}

#[test]
fn test_init_keeps_existing_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("signal.toml"), "[server]\nport = 9999\n").unwrap();

    let output = run_signal(&["init"], Some(dir.path()));
    assert!(output.status.success());
    assert!(stdout(&output).contains("already exists"));

    let content = fs::read_to_string(dir.path().join("signal.toml")).unwrap();
    assert!(content.contains("9999"));
}

#[test]
fn test_config_shows_values() {
    let dir = TempDir::new().unwrap();
    run_signal(&["init"], Some(dir.path()));

    let output = run_signal(&["config"], Some(dir.path()));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("0.0.0.0:8000"));
    assert!(text.contains("./data/signal.db"));
}

#[test]
fn test_config_validate_reports_missing_secret() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("signal.toml"),
        "[search]\napi_key_env = \"SIGNAL_CLI_TEST_UNSET_KEY\"\n",
    )
    .unwrap();

    let output = run_signal(&["config", "--validate"], Some(dir.path()));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("SIGNAL_CLI_TEST_UNSET_KEY"));
}

#[test]
fn test_config_validate_passes_with_secret() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("signal.toml"),
        "[search]\napi_key_env = \"SIGNAL_CLI_TEST_SET_KEY\"\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_signal-server"))
        .args(["config", "--validate", "--no-color"])
        .env("SIGNAL_CLI_TEST_SET_KEY", "secret")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("Configuration is valid"));
}

#[test]
fn test_config_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_signal(&["config"], Some(dir.path()));
    assert!(!output.status.success());
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("signal.toml"), "[pipeline]\nmax_concurrent_calls = 0\n").unwrap();

    let output = run_signal(&["config"], Some(dir.path()));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_concurrent_calls"));
}
