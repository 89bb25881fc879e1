//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xsd-datatypes"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_cli_validate_prints_canonical_forms() {
    let output = run(&["validate", "--type", "decimal", "01.50", "-0"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "validate should succeed");
    assert!(stdout.contains("1.5"), "should show canonical form");
    assert!(stdout.contains("0.0"), "should normalize negative zero");
}

#[test]
fn test_cli_validate_reports_failures() {
    let output = run(&["validate", "--type", "byte", "12", "300"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success(), "an invalid value should fail");
    assert!(stdout.contains("✓ \"12\""));
    assert!(stdout.contains("✗ \"300\""));
    assert!(stdout.contains("cvc-maxInclusive-valid"));
}

#[test]
fn test_cli_validate_xsd11_types() {
    let output = run(&["validate", "--type", "dateTimeStamp", "2004-04-12T13:20:00Z"]);
    assert!(!output.status.success(), "dateTimeStamp is not an XSD 1.0 type");

    let output = run(&[
        "validate",
        "--xsd11",
        "--type",
        "dateTimeStamp",
        "2004-04-12T13:20:00-05:00",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("2004-04-12T18:20:00Z"));
}

// ============================================================================
// Compare Command Tests
// ============================================================================

#[test]
fn test_cli_compare() {
    let output = run(&["compare", "--type", "duration", "P1Y", "P12M"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "equal");

    let output = run(&["compare", "--type", "duration", "P1M", "P30D"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "indeterminate");

    let output = run(&["compare", "--type", "int", "abc", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

// ============================================================================
// Inspect and Types Command Tests
// ============================================================================

#[test]
fn test_cli_inspect_text() {
    let output = run(&["inspect", "--type", "unsignedByte"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Type: unsignedByte"));
    assert!(stdout.contains("Base: unsignedShort"));
    assert!(stdout.contains("maxInclusive: 255"));
    assert!(stdout.contains("fractionDigits: 0 (fixed)"));
}

#[test]
fn test_cli_inspect_json() {
    let output = run(&["inspect", "--type", "NMTOKENS", "--json"]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("inspect --json should print JSON");
    assert_eq!(json["variety"], "list");
    assert_eq!(json["itemType"], "NMTOKEN");
    assert_eq!(json["facets"]["minLength"], "1");
}

#[test]
fn test_cli_types() {
    let output = run(&["types"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.lines().any(|l| l == "gMonthDay"));
    assert!(!stdout.lines().any(|l| l == "precisionDecimal"));

    let output = run(&["types", "--xsd11"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "precisionDecimal"));
}

#[test]
fn test_cli_unknown_type() {
    let output = run(&["inspect", "--type", "nothing"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown built-in type"));
}
