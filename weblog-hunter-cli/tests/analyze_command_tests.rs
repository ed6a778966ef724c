//! Integration tests for `weblog-hunter analyze`.
//!
//! Runs the built binary against on-disk fixtures and checks exit codes
//! and report files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn line(ip: &str, time: &str, request: &str, status: u16, ua: &str) -> String {
    format!(r#"{ip} - - [{time} +0000] "{request} HTTP/1.1" {status} 512 "-" "{ua}""#)
}

fn write_fixture(dir: &Path) {
    let mut lines = vec![
        line("10.0.0.1", "10/Apr/2024:10:00:00", "GET /index.html", 200, "Mozilla/5.0 Firefox/120.0"),
        line("10.0.0.1", "10/Apr/2024:10:00:03", "GET /about", 200, "Mozilla/5.0 Firefox/120.0"),
        "not an access log line".to_owned(),
    ];
    for i in 0..6 {
        lines.push(line(
            "203.0.113.66",
            &format!("10/Apr/2024:10:01:0{i}"),
            &format!("GET /product?id={i}'%20UNION%20SELECT%20email%20FROM%20users--"),
            500,
            "sqlmap/1.7.2#stable",
        ));
    }
    fs::write(dir.join("access.log"), lines.join("\n")).expect("should write fixture");
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_weblog-hunter"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should run")
}

#[test]
fn test_analyze_writes_all_formats() {
    // Given: a log directory with one attacker and one browser
    let temp_dir = TempDir::new().expect("should create temp dir");
    let logs = temp_dir.path().join("logs");
    fs::create_dir(&logs).expect("should create logs dir");
    write_fixture(&logs);

    // When: analyzing with --format all
    let output = run(
        temp_dir.path(),
        &["analyze", "-i", "logs", "--out", "out/scan", "--format", "all", "--quiet"],
    );

    // Then: exit 0 and three report files
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let out_dir = temp_dir.path().join("out");
    for ext in ["md", "json", "html"] {
        assert!(out_dir.join(format!("scan.{ext}")).exists(), "scan.{ext} missing");
    }

    let md = fs::read_to_string(out_dir.join("scan.md")).expect("md report");
    assert!(md.contains("- Files read: **1**"));
    assert!(md.contains("- Parse failures (non-matching lines): **1**"));
    assert!(md.contains("| 1 | 203.0.113.66 |"));
    assert!(md.contains("`/product`"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("scan.json")).expect("json report"))
            .expect("valid json");
    assert_eq!(json["summary"]["parsed_events"], 8);
    assert_eq!(json["summary"]["top_suspicious_ips"][0], "203.0.113.66");
    assert_eq!(json["summary"]["tools_by_first_seen"][0][0], "browser");
    assert_eq!(json["summary"]["tools_by_first_seen"][1][0], "sqlmap");
}

#[test]
fn test_analyze_quiet_prints_nothing_to_stdout() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_fixture(temp_dir.path());

    let output = run(temp_dir.path(), &["analyze", "-i", "access.log", "-q"]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "quiet mode should not print a summary");
    assert!(temp_dir.path().join("report.md").exists(), "default report path");
}

#[test]
fn test_analyze_json_summary_on_stdout() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_fixture(temp_dir.path());

    let output = run(
        temp_dir.path(),
        &["--output", "json", "analyze", "-i", "access.log", "--format", "json"],
    );

    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(summary["files_read"], 1);
    assert_eq!(summary["top_sqli_endpoint"], "/product");
    assert!(temp_dir.path().join("report.json").exists());
}

#[test]
fn test_analyze_missing_input_is_command_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = run(temp_dir.path(), &["analyze", "-i", "does-not-exist.log"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no input files were readable"));
}

#[test]
fn test_analyze_partial_failure_still_succeeds() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_fixture(temp_dir.path());

    let output = run(
        temp_dir.path(),
        &["analyze", "-i", "access.log", "-i", "missing.log", "-q"],
    );

    assert!(output.status.success(), "one readable file is enough");
}

#[test]
fn test_analyze_zero_top_is_config_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_fixture(temp_dir.path());

    let output = run(temp_dir.path(), &["analyze", "-i", "access.log", "--top", "0"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_analyze_invalid_config_file_is_config_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_fixture(temp_dir.path());
    fs::write(
        temp_dir.path().join("bad.toml"),
        "[output]\nformats = [\"pdf\"]\n",
    )
    .expect("should write config");

    let output = run(
        temp_dir.path(),
        &["analyze", "-i", "access.log", "--config", "bad.toml"],
    );

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_signatures_lists_catalog() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let output = run(temp_dir.path(), &["--output", "json", "signatures"]);

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["categories"].as_array().map(Vec::len), Some(9));
    assert_eq!(report["tools"][0], "sqlmap");
}
