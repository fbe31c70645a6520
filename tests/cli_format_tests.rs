//! End-to-end tests for `splitflapctl format` and `splitflapctl airports`.

use std::process::Command;

/// Path to the splitflapctl binary
fn splitflapctl_bin() -> &'static str {
    env!("CARGO_BIN_EXE_splitflapctl")
}

#[test]
fn test_format_mapped_code() {
    let output = Command::new(splitflapctl_bin())
        .args(["format", "aal"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Normalized: AAL"));
    assert!(stdout.contains("Mapped to:  AA"));
    assert!(stdout.contains("Display:    \"AA    \""));
}

#[test]
fn test_format_unmapped_code_truncates() {
    let output = Command::new(splitflapctl_bin())
        .args(["format", "SOMEUNKNOWNCODE"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(no mapping)"));
    assert!(stdout.contains("\"SOMEUN\""));
}

#[test]
fn test_format_json_output() {
    let output = Command::new(splitflapctl_bin())
        .args(["format", "ac-a", "--width", "4", "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");

    assert_eq!(result["input"], "ac-a");
    assert_eq!(result["normalized"], "ACA");
    assert_eq!(result["short_code"], "AC");
    assert_eq!(result["has_mapping"], true);
    assert_eq!(result["display"], "AC  ");
}

#[test]
fn test_format_rejects_zero_width() {
    let output = Command::new(splitflapctl_bin())
        .args(["format", "AAL", "--width", "0"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2), "Validation errors exit with 2");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Width must be between"));
}

#[test]
fn test_airports_lists_sequence() {
    let output = Command::new(splitflapctl_bin())
        .args(["airports"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  1. CYYC"));
    assert!(stdout.contains("237 airports"));
}

#[test]
fn test_airports_json() {
    let output = Command::new(splitflapctl_bin())
        .args(["airports", "--json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(result["total"], 237);
    assert_eq!(result["airports"][0], "CYYC");
    assert_eq!(result["airports"].as_array().map(Vec::len), Some(237));
}
