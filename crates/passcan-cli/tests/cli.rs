use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn passcan() -> Command {
    Command::cargo_bin("passcan").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    passcan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_process_missing_file() {
    passcan()
        .args(["process", "does-not-exist.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_empty_file_reports_failed_status() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.jpg");
    fs::write(&input, b"").unwrap();

    passcan()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\": \"failed\""))
        .stderr(predicate::str::contains("Extraction failed"));
}

#[test]
fn test_batch_without_matches() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "not a document").unwrap();

    passcan()
        .arg("batch")
        .arg(dir.path().join("*").to_string_lossy().as_ref())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn test_config_init_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("passcan.json");

    passcan()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    passcan()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    passcan()
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "ocr.fallback_languages", r#"["eng","rus"]"#])
        .assert()
        .success();

    passcan()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "ocr.fallback_languages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rus\""));

    passcan()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "ocr.unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
