//! End-to-end tests for `splitflapctl config` commands.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Path to the splitflapctl binary
fn splitflapctl_bin() -> &'static str {
    env!("CARGO_BIN_EXE_splitflapctl")
}

/// Runs the binary with an isolated config directory.
fn run_isolated(args: &[&str], config_dir: &Path) -> Output {
    Command::new(splitflapctl_bin())
        .env("SPLITFLAP_CONFIG_DIR", config_dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn show_json(config_dir: &Path) -> serde_json::Value {
    let output = run_isolated(&["config", "show", "--json"], config_dir);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("Should parse JSON output")
}

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_isolated(&["config", "show"], temp_dir.path());

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Width:            6"));
    assert!(stdout.contains("Airport interval: 2 minutes"));
    assert!(stdout.contains("Listen:           127.0.0.1:3030"));
}

#[test]
fn test_config_show_json_schema() {
    let temp_dir = TempDir::new().unwrap();

    let result = show_json(temp_dir.path());

    assert_eq!(result["display"]["width"], 6);
    assert_eq!(result["display"]["clock_format"], "HH:MM");
    assert_eq!(result["display"]["airport_interval"], "2m");
    assert_eq!(result["sink"]["kind"], "http");
    assert!(result["sink"]["device_url"].is_string());
    assert_eq!(result["sink"]["mqtt"]["port"], 1883);
    assert_eq!(result["server"]["port"], 3030);
}

// ============================================================================
// Set Command Tests
// ============================================================================

#[test]
fn test_config_set_persists_values() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_isolated(
        &[
            "config",
            "set",
            "--width",
            "8",
            "--interval",
            "15m",
            "--clock-format",
            "h:MM A",
            "--sink",
            "mqtt",
        ],
        temp_dir.path(),
    );
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(temp_dir.path().join("config.toml").exists());

    let result = show_json(temp_dir.path());
    assert_eq!(result["display"]["width"], 8);
    assert_eq!(result["display"]["airport_interval"], "15m");
    assert_eq!(result["display"]["clock_format"], "h:MM A");
    assert_eq!(result["sink"]["kind"], "mqtt");
}

#[test]
fn test_config_set_device_url() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_isolated(
        &["config", "set", "--device-url", " 10.0.0.7 "],
        temp_dir.path(),
    );
    assert_eq!(output.status.code(), Some(0));

    let result = show_json(temp_dir.path());
    assert_eq!(result["sink"]["device_url"], "10.0.0.7");
}

#[test]
fn test_config_set_requires_an_option() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_isolated(&["config", "set"], temp_dir.path());

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("At least one configuration option"));
    assert!(!temp_dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_isolated(&["config", "set", "--width", "0"], temp_dir.path());
    assert_eq!(output.status.code(), Some(2));

    let output = run_isolated(&["config", "set", "--interval", "7m"], temp_dir.path());
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid interval"));

    // Nothing was written.
    assert_eq!(show_json(temp_dir.path())["display"]["width"], 6);
}

#[test]
fn test_config_invalid_file_is_a_validation_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("config.toml"), "[display]\nwidth = 0\n").unwrap();

    let output = run_isolated(&["config", "show"], temp_dir.path());

    assert_eq!(output.status.code(), Some(2));
}
