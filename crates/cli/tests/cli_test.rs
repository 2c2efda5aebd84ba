//! # CLI Binary Tests
//!
//! Runs the `seo-audit` binary. None of these reach a model: they exit before
//! any audit starts.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn seo_audit(log_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("seo-audit").unwrap();
    cmd.env("GOOGLE_API_KEY", "test-key")
        .arg("--log-file")
        .arg(log_dir.join("seo-audit.log"));
    cmd
}

#[test]
fn test_quit_exits_cleanly() {
    // Arrange
    let dir = tempdir().unwrap();

    // Act & Assert
    seo_audit(dir.path())
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("SEO Audit Team - Interactive Mode"))
        .stdout(predicate::str::contains("Goodbye!"));
    assert!(dir.path().join("seo-audit.log").exists());
}

#[test]
fn test_invalid_url_reprompts() {
    let dir = tempdir().unwrap();

    seo_audit(dir.path())
        .write_stdin("www.example.com\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Please enter a valid URL starting with http:// or https://",
        ));
}

#[test]
fn test_invalid_url_flag_fails() {
    let dir = tempdir().unwrap();

    seo_audit(dir.path())
        .arg("--url")
        .arg("example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid URL"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempdir().unwrap();

    seo_audit(dir.path())
        .arg("--config")
        .arg(dir.path().join("missing.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
