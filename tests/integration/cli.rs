//! The `gitvars` binary end to end.

use assert_cmd::Command;
use git_variables::constants::TIMEOUT_ENV_VAR;
use git_variables::test_utils::{GitRepoFixture, ServiceFixture};
use predicates::prelude::*;
use serde_json::Value;

fn gitvars(repo: &GitRepoFixture) -> Command {
    let mut cmd = Command::cargo_bin("gitvars").unwrap();
    cmd.current_dir(repo.path())
        .env_remove(TIMEOUT_ENV_VAR)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .args(["--timeout-ms", "10000"]);
    cmd
}

fn service_repo() -> GitRepoFixture {
    let repo = GitRepoFixture::tagged_branch().unwrap();
    repo.write_file("serverless.yml", ServiceFixture::two_functions()).unwrap();
    repo
}

#[test]
fn test_queries_lists_catalog() {
    let repo = GitRepoFixture::empty().unwrap();
    gitvars(&repo)
        .arg("queries")
        .assert()
        .success()
        .stdout(predicate::str::contains("git:describeLight"))
        .stdout(predicate::str::contains("-> GIT_TAGS"));
}

#[test]
fn test_resolve_prints_one_value_per_line() {
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let short = repo.git().short_head().unwrap();

    gitvars(&repo)
        .args(["resolve", "sha1", "git:branch"])
        .assert()
        .success()
        .stdout(format!("{short}\nanother_branch\n"));
}

#[test]
fn test_resolve_json_with_service_document() {
    let repo = service_repo();
    let short = repo.git().short_head().unwrap();

    let output = gitvars(&repo)
        .args(["resolve", "--json", "self:custom.banner", "describe"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let values: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(values["self:custom.banner"], format!("build {short} on dev").as_str());
    assert_eq!(values["describe"], format!("my_tag-1-g{short}").as_str());
}

#[test]
fn test_resolve_unknown_key_lists_candidates() {
    let repo = GitRepoFixture::tagged_branch().unwrap();

    gitvars(&repo)
        .args(["resolve", "badKey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Git variable badKey is unknown"))
        .stderr(predicate::str::contains("'describe', 'describeLight'"));
}

#[test]
fn test_resolve_in_empty_repository_reports_git_error() {
    let repo = GitRepoFixture::empty().unwrap();

    gitvars(&repo)
        .args(["resolve", "describe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Command failed: git describe --always"))
        .stderr(predicate::str::contains("needs at least one commit"));
}

#[test]
fn test_package_prints_exported_document() {
    let repo = service_repo();
    let short = repo.git().short_head().unwrap();

    let output = gitvars(&repo).arg("package").output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    let hello = &document["functions"]["hello"];
    assert_eq!(hello["environment"]["GIT_COMMIT_SHORT"], short.as_str());
    assert_eq!(hello["environment"]["GIT_BRANCH"], "another_branch");
    assert_eq!(hello["tags"]["GIT_IS_DIRTY"], "false");
    assert_eq!(document["functions"]["world"]["environment"]["GIT_BRANCH"], "pinned");
    assert_eq!(document["custom"]["sha"], short.as_str());
}

#[test]
fn test_package_writes_output_file() {
    let repo = service_repo();

    gitvars(&repo)
        .args(["package", "--output", "out/svc.yml"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("Packaged 2 function(s)"));

    let written = std::fs::read_to_string(repo.path().join("out/svc.yml")).unwrap();
    assert!(written.contains("GIT_REPOSITORY"));
    assert!(written.contains(&repo.dir_name()));
}

#[test]
fn test_package_without_service_file_fails() {
    let repo = GitRepoFixture::single_commit().unwrap();

    gitvars(&repo)
        .arg("package")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Service file not found"));
}

#[test]
fn test_offline_shows_function_environments() {
    let repo = service_repo();
    let short = repo.git().short_head().unwrap();

    gitvars(&repo)
        .arg("offline")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello:"))
        .stdout(predicate::str::contains(format!("  GIT_COMMIT_SHORT={short}")))
        .stdout(predicate::str::contains("  GIT_BRANCH=pinned"));
}

#[test]
fn test_print_respects_disabled_export() {
    let repo = GitRepoFixture::single_commit().unwrap();
    repo.write_file(
        "serverless.yml",
        "service: svc\ncustom:\n  exportGitVariables: false\n  user: ${git:user}\n\
         functions:\n  hello:\n    handler: handler.hello\n",
    )
    .unwrap();

    let output = gitvars(&repo).args(["print", "--format", "json"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("GIT_"), "{stdout}");
    let document: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(document["custom"]["user"], "Test User");
}

#[test]
fn test_opt_values_reach_placeholders() {
    let repo = GitRepoFixture::single_commit().unwrap();

    gitvars(&repo)
        .args(["--opt", "stage=prod", "resolve", "${opt:stage}-${git:branch}"])
        .assert()
        .success()
        .stdout(predicate::str::is_match("^prod-(main|master)\n$").unwrap());
}
