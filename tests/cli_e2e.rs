//! End-to-end tests for the `vault-setup` binary.
//!
//! These tests invoke the binary directly and check exit codes and output.
//! Anything that would hit the network (access probing, cloning) is out of
//! scope here and covered by the pipeline suites with scripted fakes; the
//! scenarios below all fail or finish before the first network call.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get a Command for the vault-setup binary
fn vault_setup_cmd() -> Command {
    Command::cargo_bin("vault-setup").unwrap()
}

#[test]
fn test_help() {
    vault_setup_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Provision private Git-backed"));
}

#[test]
fn test_version() {
    vault_setup_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vault-setup"));
}

#[test]
fn test_provision_help() {
    vault_setup_cmd()
        .arg("provision")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--install-root"))
        .stdout(predicate::str::contains("--vault"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    vault_setup_cmd().arg("frobnicate").assert().code(2);
}

#[test]
fn test_provision_missing_registry_file() {
    vault_setup_cmd()
        .arg("provision")
        .arg("--registry")
        .arg("/nonexistent/registry.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Registry file not found"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn test_provision_malformed_registry_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let registry = temp.child("registry.yaml");
    registry.write_str("vaults: [not closed").unwrap();

    vault_setup_cmd()
        .arg("provision")
        .arg("--registry")
        .arg(registry.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML parsing error"));
}

#[test]
fn test_provision_empty_registry_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let registry = temp.child("registry.yaml");
    registry.write_str("vaults: []").unwrap();

    vault_setup_cmd()
        .arg("provision")
        .arg("--registry")
        .arg(registry.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no vaults"));
}

#[test]
fn test_list_missing_registry_file() {
    vault_setup_cmd()
        .arg("list")
        .arg("--registry")
        .arg("/nonexistent/registry.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Registry file not found"));
}

#[test]
fn test_completions_bash() {
    vault_setup_cmd()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("vault-setup"));
}

#[test]
fn test_completions_rejects_unknown_shell() {
    vault_setup_cmd()
        .arg("completions")
        .arg("tcsh")
        .assert()
        .code(2);
}
