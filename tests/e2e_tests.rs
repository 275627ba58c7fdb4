//! End-to-end tests for the ipass_provisioning binary
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a test config file
fn create_test_config(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join("provisioning.xml");
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

fn binary() -> Command {
    let mut cmd = Command::cargo_bin("ipass_provisioning").unwrap();
    cmd.env_remove("IPASS_API_KEY").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_no_arguments_prints_usage() {
    binary()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage: ipass_provisioning"));
}

#[test]
fn test_unknown_command() {
    binary()
        .args(["provisioning.xml", "frobnicate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown command: frobnicate"));
}

#[test]
fn test_missing_config_file() {
    binary()
        .args(["/nonexistent/provisioning.xml", "get", "1", "jdoe@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_config_without_api_key() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(&temp_dir, "<provisioning></provisioning>");

    binary()
        .arg(config_path.to_str().unwrap())
        .args(["get", "1", "jdoe@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_key is not configured"));
}

#[test]
fn test_get_against_mock_server() {
    let mut server = mockito::Server::new();
    let search = server
        .mock("GET", "/v1/users")
        .match_query(mockito::Matcher::UrlEncoded("service".into(), "search".into()))
        .with_status(200)
        .with_body("<endUsers><endUser><endUserId>31</endUserId></endUser></endUsers>")
        .create();

    let temp_dir = TempDir::new().unwrap();
    let config_path = create_test_config(
        &temp_dir,
        &format!(
            "<provisioning><api_key>k</api_key><api_base_url>{}/v1/users</api_base_url></provisioning>",
            server.url()
        ),
    );

    binary()
        .arg(config_path.to_str().unwrap())
        .args(["get", "1", "jdoe@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<endUserId>31</endUserId>"));

    search.assert();
}
