mod common;
use common::*;

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn model_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("user_account.json"),
        r#"{
            "fields": {
                "id": { "type": "int-4", "auto_increment": true },
                "name": { "type": "varchar-20" }
            },
            "properties": { "name": "UserAccount" }
        }"#,
    )
    .unwrap();
    dir
}

#[test]
fn create_prints_create_table() {
    let dir = model_dir();

    let output = Command::cargo_bin("tablekeeper")
        .unwrap()
        .args(["create", "--model"])
        .arg(dir.path())
        .env_remove("TABLEKEEPER_DEBUG")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "CREATE TABLE user_account (id INT AUTO_INCREMENT, name VARCHAR(20));\n"
    );
}

#[test]
fn fingerprint_matches_library() {
    let dir = model_dir();
    fs::write(dir.path().join("example.json"), EXAMPLE_MODEL).unwrap();

    let output = Command::cargo_bin("tablekeeper")
        .unwrap()
        .args(["fingerprint", "--model"])
        .arg(dir.path().join("example.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim(),
        format!("{}  Example", example_model().fingerprint())
    );
}

#[test]
fn invalid_model_fails_with_message() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.json"),
        r#"{ "fields": { "id": { "type": "varchar-0" } }, "properties": { "name": "Bad" } }"#,
    )
    .unwrap();

    let output = Command::cargo_bin("tablekeeper")
        .unwrap()
        .args(["create", "--model"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Invalid type varchar-0"));
}

#[test]
fn plan_requires_a_database() {
    let dir = model_dir();

    Command::cargo_bin("tablekeeper")
        .unwrap()
        .args(["plan", "--model"])
        .arg(dir.path())
        .env_remove("DATABASE_URL")
        .assert()
        .failure();
}
