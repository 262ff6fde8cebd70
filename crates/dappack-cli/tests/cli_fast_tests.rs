//! Fast CLI tests using assert_cmd.
//! These test the binary directly without needing a container runtime.

#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but works fine

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_flag() {
    Command::cargo_bin("dappack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dapp container launcher"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("dappack")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn test_subcommand_help() {
    for subcmd in &["list", "status", "show", "run", "stop"] {
        Command::cargo_bin("dappack")
            .unwrap()
            .args([subcmd, "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_run_requires_uid() {
    Command::cargo_bin("dappack")
        .unwrap()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("UID"));
}

#[test]
fn test_run_has_reset_flag() {
    Command::cargo_bin("dappack")
        .unwrap()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--reset"));
}

#[test]
fn test_unknown_subcommand_fails() {
    Command::cargo_bin("dappack")
        .unwrap()
        .arg("teleport")
        .assert()
        .failure();
}
