//! E2E tests for the command line interface

use std::process::{Command, Output};

fn nltax(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test the summary table for the bundled 2023 rates
#[test]
fn summary_table() {
    let output = nltax(&["summary", "-i", "60000", "-y", "2023"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    // Verify the command succeeded
    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("INCOME TAX ESTIMATE (2023, working)"));
    assert!(stdout.contains("Payroll Tax"));
    assert!(stdout.contains("11886"));
    assert!(stdout.contains("Income After Tax"));
    assert!(stdout.contains("42236"));
    assert!(stdout.contains("Disclaimer"));
}

/// Test summary JSON output for someone retiring next year
#[test]
fn summary_json_retiring() {
    let output = nltax(&["summary", "-i", "60000", "-y", "2023", "--retire", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary output is not JSON");
    assert_eq!(json["tax_year"], "2023");
    assert_eq!(json["retire"], true);
    assert_eq!(json["income_before_tax"], 60000);
    assert_eq!(json["social_security_tax"], 3622);
    assert_eq!(json["income_after_tax"], 48886);
}

/// Test that the latest year is used when none is given
#[test]
fn summary_defaults_to_latest_year() {
    let output = nltax(&["summary", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["tax_year"], "2023");
    assert_eq!(json["income_after_tax"], 42236);
}

/// Test that a negative income is rejected
#[test]
fn summary_rejects_negative_income() {
    let output = nltax(&["summary", "-i", "-5"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("income cannot be negative"));
}

/// Test that an unknown tax year is rejected
#[test]
fn summary_rejects_unknown_year() {
    let output = nltax(&["summary", "-y", "1999"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("no rates for tax year 1999"));
}

/// Test the breakpoint table of the labour credit
#[test]
fn curve_breakpoints() {
    let output = nltax(&["curve", "-t", "labour-credit", "-y", "2023"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("LABOUR TAX CREDIT (2023)"));
    assert!(stdout.contains("10741"));
    assert!(stdout.contains("115296"));
}

/// Test chart CSV export
#[test]
fn curve_csv() {
    let output = nltax(&["curve", "-t", "payroll-tax", "-y", "2023", "--csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("year,concept,income,amount"));
    assert_eq!(lines.next(), Some("2023,payroll-tax,0,0"));
    assert_eq!(stdout.lines().count(), 3002);
    assert!(stdout.contains("2023,payroll-tax,120000,76099"));
}

/// Test the HTML report written to a file
#[test]
fn html_report_to_file() {
    let path = std::env::temp_dir().join(format!("nltax-e2e-{}.html", std::process::id()));
    let output = nltax(&[
        "html",
        "-i",
        "60000",
        "-y",
        "2023",
        "-o",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let html = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(html.contains("<title>Your Payroll Tax: 11886</title>"));
    assert_eq!(html.matches("<svg").count(), 4);
}

/// Test validation of the bundled rates
#[test]
fn validate_bundled() {
    let output = nltax(&["validate"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("VALIDATION RESULTS (bundled rates)"));
    assert!(stdout.contains("Rate document is valid"));
    assert!(stdout.contains("120000"));
}

/// Test validation of a document with a gap between brackets
#[test]
fn validate_gap_fails() {
    let output = nltax(&["-c", "tests/data/gap_rates.json", "validate", "--json"]);
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("bracket starts at 37200, expected 37150"), "{error}");
}

/// Test that estimates refuse a broken rate document
#[test]
fn summary_with_broken_config_fails() {
    let output = nltax(&["-c", "tests/data/gap_rates.json", "summary"]);
    assert!(!output.status.success());
}

/// Test schema output
#[test]
fn schema_outputs() {
    let output = nltax(&["schema"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("payrollTax"));
    assert!(stdout.contains("incomeCeiling"));

    let output = nltax(&["schema", "csv-header"]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "year,concept,income,amount"
    );
}
