//! Integration tests for the bmi_cli binary.
//!
//! These tests verify end-to-end behavior including:
//! - Calculation recording workflow
//! - History ordering, capping and date filtering
//! - Statistics output
//! - CSV rollup operations

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bmitrack"))
}

/// Record one calculation in the given data dir
fn calc(data_dir: &std::path::Path, height: f64, weight: f64) {
    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--height")
        .arg(height.to_string())
        .arg("--weight")
        .arg(weight.to_string())
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI tracking and statistics system"));
}

#[test]
fn test_calc_computes_and_records() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--height")
        .arg("1.75")
        .arg("--weight")
        .arg("70")
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 22.86"))
        .stdout(predicate::str::contains("Category: Normal"))
        .stdout(predicate::str::contains("Calculation recorded"));

    // Verify the log has content
    let wal_path = data_dir.join("wal/calculations.wal");
    let wal_content = fs::read_to_string(&wal_path).expect("Failed to read log");
    assert!(!wal_content.is_empty());
    assert!(wal_content.contains("owner_id"));
}

#[test]
fn test_calc_log_record_fields() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    calc(&data_dir, 1.75, 100.0);

    let wal_content =
        fs::read_to_string(data_dir.join("wal/calculations.wal")).expect("Failed to read log");
    let record: serde_json::Value =
        serde_json::from_str(wal_content.lines().next().unwrap()).expect("Invalid log line");

    assert_eq!(record["height"], 1.75);
    assert_eq!(record["weight"], 100.0);
    assert_eq!(record["bmi"], 32.65);
    assert_eq!(record["category"], "obese");
    assert!(record["id"].is_string());
    assert!(record["created_at"].is_string());
}

#[test]
fn test_calc_rejects_negative_height() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--height=-1")
        .arg("--weight")
        .arg("70")
        .assert()
        .failure()
        .stderr(predicate::str::contains("height must be a positive number"));

    // Nothing reached the store
    assert!(!data_dir.join("wal/calculations.wal").exists());
}

#[test]
fn test_calc_rejects_zero_weight() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--height")
        .arg("1.75")
        .arg("--weight")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight must be a positive number"));

    assert!(!data_dir.join("wal/calculations.wal").exists());
}

#[test]
fn test_history_newest_first_with_limit() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    calc(&data_dir, 1.75, 70.0);
    calc(&data_dir, 1.75, 80.0);
    calc(&data_dir, 1.75, 90.0);

    // limit 1 returns only the most recent record (weight 90 → bmi 29.39)
    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--limit")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("29.39"))
        .stdout(predicate::str::contains("22.86").not())
        .stdout(predicate::str::contains("1 record(s)"));
}

#[test]
fn test_history_excluding_range_is_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    calc(&data_dir, 1.75, 70.0);

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--from")
        .arg("1990-01-01")
        .arg("--to")
        .arg("1990-12-31")
        .assert()
        .success()
        .stdout(predicate::str::contains("No calculations found."));
}

#[test]
fn test_history_rejects_malformed_date() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--from")
        .arg("2024-13-01")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn test_history_rejects_non_positive_limit() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--limit")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("limit must be a positive integer"));
}

#[test]
fn test_stats_empty_state() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total calculations: 0"))
        .stdout(predicate::str::contains("Average BMI: 0.00"));
}

#[test]
fn test_stats_with_data() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    calc(&data_dir, 1.75, 70.0);
    calc(&data_dir, 1.75, 80.0);

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total calculations: 2"))
        // newest (26.12) minus previous (22.86)
        .stdout(predicate::str::contains("BMI change (last two): +3.26"))
        .stdout(predicate::str::contains("Weight change (last two): +10.00 kg"))
        .stdout(predicate::str::contains("Normal"))
        .stdout(predicate::str::contains("Overweight"))
        .stdout(predicate::str::contains("50.0%"))
        .stdout(predicate::str::contains("Time series (oldest first):"));
}

#[test]
fn test_stats_excluding_range_is_zero_state() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    calc(&data_dir, 1.75, 70.0);

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--from")
        .arg("1990-01-01")
        .arg("--to")
        .arg("1990-12-31")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total calculations: 0"));
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    for weight in [70.0, 80.0, 90.0] {
        calc(&data_dir, 1.75, weight);
    }

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 calculations"));

    let csv_path = data_dir.join("calculations.csv");
    assert!(csv_path.exists());

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.contains("id,owner_id"));
}

#[test]
fn test_rollup_with_cleanup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    calc(&data_dir, 1.75, 70.0);

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned up 1 processed log"));

    let wal_dir = data_dir.join("wal");
    let leftovers: Vec<_> = fs::read_dir(&wal_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".wal.processed"))
        .collect();
    assert_eq!(leftovers.len(), 0);
}

#[test]
fn test_empty_rollup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("wal")).unwrap();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_history_spans_rollup_boundary() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // One archived record, one live record
    calc(&data_dir, 1.75, 70.0);
    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
    calc(&data_dir, 1.75, 80.0);

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("22.86"))
        .stdout(predicate::str::contains("26.12"))
        .stdout(predicate::str::contains("2 record(s)"));

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total calculations: 2"));
}

#[test]
fn test_records_are_scoped_to_user() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--user")
        .arg("alice@example.com")
        .arg("--height")
        .arg("1.75")
        .arg("--weight")
        .arg("70")
        .assert()
        .success();

    cli()
        .arg("calc")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--user")
        .arg("bob@example.com")
        .arg("--height")
        .arg("1.80")
        .arg("--weight")
        .arg("90")
        .assert()
        .success();

    // Each user sees only their own records
    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--user")
        .arg("alice@example.com")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total calculations: 1"))
        .stdout(predicate::str::contains("Average BMI: 22.86"));

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--user")
        .arg("bob@example.com")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 record(s)"))
        .stdout(predicate::str::contains("22.86").not());
}
