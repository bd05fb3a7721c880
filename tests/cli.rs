//
//  teamcity-client
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

mod common;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{rest, TOKEN};

/// A `tc` command isolated from the user's environment and config file.
fn tc(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tc").unwrap();
    cmd.env("TC_CONFIG", config)
        .env("TC_NO_PROMPT", "true")
        .env_remove("TEAMCITY_URL")
        .env_remove("TEAMCITY_TOKEN")
        .env_remove("TC_DEBUG");
    cmd
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    tc(&dir.path().join("config.toml"))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_configuration_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    tc(&dir.path().join("config.toml"))
        .args(["build", "view", "1"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("CONFIGURATION_ERROR"));
}

#[test]
fn test_config_path_honors_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("tc.toml");
    tc(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tc.toml"));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    tc(&path)
        .args(["config", "set", "defaults.tree_max_depth", "3"])
        .assert()
        .success();
    assert!(path.exists());

    tc(&path)
        .args(["config", "get", "defaults.tree_max_depth"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_config_rejects_unknown_key_and_bad_url() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    tc(&path)
        .args(["config", "set", "server.password", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));

    tc(&path)
        .args(["config", "set", "server.url", "ftp://ci.example.com"])
        .assert()
        .failure();
    assert!(!path.exists());
}

#[test]
fn test_token_is_never_printed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    tc(&path)
        .args(["config", "set", "server.token", TOKEN])
        .assert()
        .success()
        .stdout(predicate::str::contains(TOKEN).not());

    tc(&path)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(TOKEN).not())
        .stdout(predicate::str::contains("(set)"));
}

#[test]
fn test_auth_failure_exits_with_auth_code() {
    let mut server = mockito::Server::new();
    let _m1 = server
        .mock("GET", rest("/builds/id:7"))
        .with_status(401)
        .create();

    let dir = TempDir::new().unwrap();
    tc(&dir.path().join("config.toml"))
        .env("TEAMCITY_URL", server.url())
        .env("TEAMCITY_TOKEN", TOKEN)
        .args(["build", "view", "7"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("AUTHENTICATION_FAILED"))
        .stderr(predicate::str::contains(TOKEN).not());
}

#[test]
fn test_call_reports_tool_errors() {
    let dir = TempDir::new().unwrap();
    tc(&dir.path().join("config.toml"))
        .env("TEAMCITY_URL", "https://ci.example.com")
        .env("TEAMCITY_TOKEN", TOKEN)
        .args(["call", r#"{"operation":"drop_database"}"#])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"ok\": false"));
}

#[test]
fn test_malformed_config_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, format!("[server\ntoken = \"{TOKEN}\"\n")).unwrap();

    tc(&path)
        .env("TEAMCITY_URL", "https://ci.example.com")
        .env("TEAMCITY_TOKEN", TOKEN)
        .args(["build", "view", "1"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Configuration file could not be read"))
        .stderr(predicate::str::contains(TOKEN).not());
}
