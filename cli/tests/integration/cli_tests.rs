//! Integration tests for the chefboot CLI skeleton: help, version, global flags.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::fixture::chefboot;

#[test]
fn test_cli_no_args_shows_help() {
    // arg_required_else_help prints help on stderr and exits 2
    chefboot().assert().code(2).stderr(predicate::str::contains(
        "Compose Chef bootstrap scripts for node groups",
    ));
}

#[test]
fn test_cli_help_flag_lists_commands() {
    chefboot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("compose"))
        .stdout(predicate::str::contains("client"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    chefboot()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chefboot"));
}

#[test]
fn test_version_command_shows_version() {
    chefboot()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chefboot 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = chefboot()
        .args(["version", "--json"])
        .output()
        .expect("run chefboot");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["version"], "0.1.0");
}

#[test]
fn test_unknown_command_fails() {
    chefboot()
        .arg("provision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_compose_requires_a_group() {
    chefboot()
        .arg("compose")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<GROUPS>"));
}

#[test]
fn test_blank_group_is_rejected_by_parser() {
    chefboot()
        .args(["compose", "  "])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("group"));
}

#[test]
fn test_unknown_os_is_rejected_by_parser() {
    chefboot()
        .args(["compose", "web", "--os", "beos"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("beos"));
}
