//! Persistence and recovery tests for the medtrack_cli binary.
//!
//! The store lives in a single JSON snapshot; these tests verify it
//! survives across invocations and that a damaged snapshot degrades to an
//! empty store instead of breaking the CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("medtrack"))
}

#[test]
fn test_state_persists_across_runs() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("add")
        .arg("Warfarin")
        .arg("--time")
        .arg("23:59")
        .arg("--days")
        .arg("mon,wed,fri")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    // A separate invocation sees the same store
    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Warfarin"))
        .stdout(predicate::str::contains("Mon, Wed, Fri"));
}

#[test]
fn test_snapshot_is_valid_json() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("add")
        .arg("Warfarin")
        .arg("--time")
        .arg("23:59")
        .arg("--days")
        .arg("daily")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let contents = fs::read_to_string(data_dir.join("store.json")).expect("Failed to read store");
    let value: serde_json::Value = serde_json::from_str(&contents).expect("store is not JSON");

    assert_eq!(value["medications"].as_array().unwrap().len(), 1);
    assert_eq!(value["occurrences"].as_array().unwrap().len(), 30);
    assert_eq!(value["medications"][0]["name"], "Warfarin");
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("store.json"), "{ not json at all").unwrap();

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No medications registered"));
}

#[test]
fn test_corrupt_snapshot_is_replaced_on_next_write() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("store.json"), "{ not json at all").unwrap();

    // Adding works and rewrites a clean snapshot
    cli()
        .arg("add")
        .arg("Warfarin")
        .arg("--time")
        .arg("23:59")
        .arg("--days")
        .arg("daily")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let contents = fs::read_to_string(data_dir.join("store.json")).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&contents).is_ok());
}
