//! End-to-end CLI tests for the inventory-export binary.

#![allow(deprecated)]

mod support;
use support::socket_guard::{socket_skip_return, start_mock_server_or_skip};

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const STEAM_ID: &str = "76561197960287930";

/// Binary with an isolated config home and no API key in the environment.
fn isolated_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("inventory-export").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("STEAM_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("inventory-export").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export a Steam inventory as CSV"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("inventory-export").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("inventory-export"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("inventory-export").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_missing_reference_returns_error() {
    let mut cmd = Command::cargo_bin("inventory-export").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("REFERENCE"));
}

#[test]
fn test_binary_without_api_key_exits_one() {
    let tempdir = TempDir::new().unwrap();
    let assert = isolated_cmd(tempdir.path())
        .arg("-q")
        .arg(STEAM_ID)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server is missing its inventory backend configuration."));
    assert_eq!(assert.get_output().status.code(), Some(1));
}

#[test]
fn test_binary_invalid_reference_exits_two() {
    let tempdir = TempDir::new().unwrap();
    let assert = isolated_cmd(tempdir.path())
        .env("STEAM_API_KEY", "TESTKEY")
        .arg("-q")
        .arg("https://steamcommunity.com/id/")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide a valid Steam profile URL"));
    assert_eq!(assert.get_output().status.code(), Some(2));
}

#[test]
fn test_binary_rejects_unknown_config_key() {
    let tempdir = TempDir::new().unwrap();
    let config = write_config(tempdir.path(), "retries = 3\n");
    isolated_cmd(tempdir.path())
        .arg("--config")
        .arg(&config)
        .arg(STEAM_ID)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[tokio::test]
async fn test_binary_writes_csv_file_to_output_dir() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path(format!("/inventory/{STEAM_ID}/730/2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [{"assetid": "1", "classid": "7", "instanceid": "0", "amount": "1"}],
            "descriptions": [{
                "classid": "7", "instanceid": "0", "name": "Case Key",
                "market_hash_name": "Case Key", "type": "Base Grade Key",
                "tradable": 1, "marketable": 1
            }],
            "total_inventory_count": 1,
            "success": 1
        })))
        .mount(&server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let out_dir = tempdir.path().join("out");
    let config = write_config(
        tempdir.path(),
        &format!("api_key = \"TESTKEY\"\ncommunity_base_url = \"{}\"\n", server.uri()),
    );

    isolated_cmd(tempdir.path())
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("-q")
        .arg(format!("https://steamcommunity.com/profiles/{STEAM_ID}/"))
        .assert()
        .success();

    let written =
        std::fs::read_to_string(out_dir.join(format!("inventory_{STEAM_ID}.csv"))).unwrap();
    assert!(written.starts_with("\"Asset ID\",\"Class ID\""));
    assert!(written.ends_with("\"Base Grade Key\",\"Yes\",\"Yes\""));
}

#[tokio::test]
async fn test_binary_stdout_mode_prints_csv() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path("/IEconItems_730/GetPlayerItems/v0001/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"status": 1, "items": [{"id": 5, "defindex": 1, "quality": 4}]}
        })))
        .mount(&server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let config = write_config(tempdir.path(), &format!("api_base_url = \"{}\"\n", server.uri()));

    isolated_cmd(tempdir.path())
        .env("STEAM_API_KEY", "TESTKEY")
        .arg("--config")
        .arg(&config)
        .arg("--backend")
        .arg("legacy")
        .arg("--stdout")
        .arg("-q")
        .arg(STEAM_ID)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\"Item ID\",\"Original ID\""))
        .stdout(predicate::str::ends_with("\"5\",\"\",\"1\",\"4\",\"\",\"1\",\"\""));
}

#[tokio::test]
async fn test_binary_private_inventory_exits_two() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("GET"))
        .and(path(format!("/inventory/{STEAM_ID}/730/2")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let config = write_config(
        tempdir.path(),
        &format!("api_key = \"TESTKEY\"\ncommunity_base_url = \"{}\"\n", server.uri()),
    );

    let assert = isolated_cmd(tempdir.path())
        .arg("--config")
        .arg(&config)
        .arg("-q")
        .arg(STEAM_ID)
        .assert()
        .failure()
        .stderr(predicate::str::contains("This inventory is private"));
    assert_eq!(assert.get_output().status.code(), Some(2));
}
