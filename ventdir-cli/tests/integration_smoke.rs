//! Smoke tests to verify command module wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn ventdir() -> Command {
    Command::cargo_bin("ventdir").unwrap()
}

// === Data Job Tests ===

#[test]
fn test_import_help() {
    ventdir()
        .args(["import", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--location"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_import_requires_location() {
    ventdir()
        .arg("import")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--location"));
}

#[test]
fn test_migrate_images_help() {
    ventdir()
        .args(["migrate-images", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--download-local"))
        .stdout(predicate::str::contains("--start-after"));
}

#[test]
fn test_migrate_photos_help() {
    ventdir()
        .args(["migrate-photos", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-photos"));
}

#[test]
fn test_image_metadata_rejects_unknown_site() {
    ventdir()
        .args(["image-metadata", "--site", "example-site"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// === Server / Diagnostics Tests ===

#[test]
fn test_serve_help() {
    ventdir()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"));
}

#[test]
fn test_check_db_help() {
    ventdir()
        .args(["check", "db", "--help"])
        .assert()
        .success();
}

#[test]
fn test_check_cloudflare_help() {
    ventdir()
        .args(["check", "cloudflare", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--upload"));
}

// === Config Tests ===

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ventdir.toml");
    let path_arg = path.to_str().unwrap();

    ventdir()
        .args(["config", "init", "--path", path_arg])
        .assert()
        .success();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[server]"));

    ventdir()
        .args(["config", "init", "--path", path_arg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    ventdir()
        .args(["config", "init", "--path", path_arg, "--force"])
        .assert()
        .success();
}

// === Completions ===

#[test]
fn test_completions_bash() {
    ventdir()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ventdir"));
}
