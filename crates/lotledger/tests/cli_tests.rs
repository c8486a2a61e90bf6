//! End-to-end tests for the `lotledger-report` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn report(file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lotledger-report"))
        .arg(file)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run lotledger-report")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_holdings_json() {
    let output = report(
        &fixture("portfolio.json"),
        &["holdings", "--as-of", "2024-06-30", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["security"], "ACME");
    assert_eq!(rows[0]["shares"], "150");
    assert_eq!(rows[0]["cost_basis"], "3000");
    assert_eq!(rows[0]["realized_gain"], "500");

    // 204 from the buy and stock dividend, 6 reinvested
    assert_eq!(rows[1]["security"], "GLOBEX");
    assert_eq!(rows[1]["shares"], "210");
    assert_eq!(rows[1]["cost_basis"], "2066");
    assert_eq!(rows[1]["market_value"], "2625.00");
    assert_eq!(rows[1]["unrealized_gain"], "559.00");
}

#[test]
fn test_holdings_text_lists_lots() {
    let output = report(
        &fixture("portfolio.json"),
        &["holdings", "--as-of", "2024-06-30", "--lots"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.starts_with("Security"));
    assert!(text.contains("2023-01-03 (544 days)"));
    assert!(text.contains("2024-05-15 (46 days)"));
}

#[test]
fn test_timeline_for_one_security() {
    let output = report(
        &fixture("portfolio.json"),
        &["timeline", "--security", "GLOBEX"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|line| line.contains("GLOBEX")));
    assert!(lines[1].ends_with("distribute 4"));
}

#[test]
fn test_lifo_override() {
    let output = report(
        &fixture("portfolio.json"),
        &["timeline", "--security", "ACME", "--method", "lifo"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("sell 50 LIFO"));
}

#[test]
fn test_performance() {
    let output = report(
        &fixture("portfolio.json"),
        &[
            "performance",
            "--as-of",
            "2024-06-30",
            "--lookback",
            "1y",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let acme = &rows[0];
    assert_eq!(acme["start_date"], "2023-06-30");
    assert_eq!(acme["start_value"], "5000");
    assert_eq!(acme["end_value"], "9750");
    assert_eq!(acme["change"], "4750");
}

#[test]
fn test_strict_prices_fails_without_price() {
    let output = report(&fixture("portfolio.json"), &["--strict-prices", "timeline"]);
    assert!(!output.status.success());
    // The split on 2023-09-01 is priced, the stock dividend is not
    let err = stderr(&output);
    assert!(err.contains("failed to replay GLOBEX"), "stderr: {err}");
    assert!(err.contains("no USD price for GLOBEX"), "stderr: {err}");
}

#[test]
fn test_replay_error_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"{ "securities": [ { "symbol": "ACME", "transactions": [
            { "kind": "buy", "date": "2024-01-02", "quantity": "10", "amount": "1000" },
            { "kind": "sell", "date": "2024-02-01", "quantity": "11", "amount": "1200" }
        ] } ] }"#,
    )
    .unwrap();

    let output = report(file.path(), &["holdings"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.starts_with("error: failed to replay ACME"), "stderr: {err}");
    assert!(err.contains("2024-02-01"), "stderr: {err}");
}

#[test]
fn test_invalid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not json").unwrap();

    let output = report(file.path(), &["holdings"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid portfolio file"));
}
