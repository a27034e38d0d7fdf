//! Binary-level argument handling tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn canopy() -> Command {
    let mut cmd = Command::cargo_bin("canopy").unwrap();
    // Keep the host environment from satisfying the token flag.
    cmd.env_remove("GITHUB_TOKEN");
    cmd
}

#[test]
fn help_lists_sync_flags() {
    canopy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--repo-path"))
        .stdout(predicate::str::contains("--preserve-repo-files"))
        .stdout(predicate::str::contains("--create-pull-request"));
}

#[test]
fn missing_required_arguments_fail() {
    canopy()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--user"));
}

#[test]
fn missing_token_fails_with_env_hint() {
    canopy()
        .args([
            "--user",
            "octocat",
            "--repo",
            "site",
            "--local-path",
            "./public",
            "--repo-path",
            "assets",
            "--message",
            "Publish",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token"));
}

#[test]
fn version_prints() {
    canopy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("canopy"));
}
