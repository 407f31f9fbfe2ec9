//! Smoke tests of the `tsdserver` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tsdserver() -> Command {
    let mut cmd = Command::cargo_bin("tsdserver").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    tsdserver()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_check_valid_config() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tsdserver.json"),
        r#"{ "welcome": "app.html", "fallback": { "old.js": "new.js" } }"#,
    )
    .unwrap();

    tsdserver()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"welcome\": \"app.html\""))
        .stderr(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_check_reports_issues() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("tsdserver.toml"),
        "ecmaVersion = 3\n[moduleResolver]\nstrategy = \"compiler\"\ntsconfig = \"missing.json\"\n",
    )
    .unwrap();

    tsdserver()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ecmaVersion"))
        .stderr(predicate::str::contains("moduleResolver.tsconfig"))
        .stderr(predicate::str::contains("2 configuration issue(s)"));
}

#[test]
fn test_check_rejects_unknown_field() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("custom.json"), r#"{ "port": 8080 }"#).unwrap();

    tsdserver()
        .current_dir(temp.path())
        .args(["check", "custom.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"))
        .stderr(predicate::str::contains("Hint:"));
}

#[test]
fn test_check_schema() {
    tsdserver()
        .args(["check", "--schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrapJsResources"));
}

#[test]
fn test_serve_rejects_bad_endpoint() {
    tsdserver()
        .args(["serve", "--listen", "ftp://localhost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme"));
}
