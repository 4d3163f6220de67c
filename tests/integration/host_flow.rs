//! Host commands with the git-variables plugin over a real repository.

use git_variables::git::{GitCliProvider, GitQuery};
use git_variables::host::{Host, HostCommand};
use git_variables::plugin::GitVariablesPlugin;
use git_variables::service::{HostResolver, ServiceConfig, ServiceFormat};
use git_variables::test_utils::{GitRepoFixture, ServiceFixture, init_test_logging};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn setup(repo: &GitRepoFixture, yaml: &str) -> (Host, Arc<GitVariablesPlugin>) {
    let service = ServiceConfig::parse(yaml, ServiceFormat::Yaml).unwrap();
    let mut host = Host::new(service, HostResolver::new().with_option("stage", "prod"));
    let provider = GitCliProvider::new()
        .with_repo_dir(repo.path())
        .with_timeout(Duration::from_secs(10));
    let plugin = GitVariablesPlugin::register(&mut host, Arc::new(provider));
    (host, plugin)
}

#[tokio::test]
async fn test_inserts_variables() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let short = repo.git().short_head().unwrap();
    let yaml = r#"service: my-service
custom:
  describe: ${git:describe}
  describe2: ${git:describeLight}
  sha1: ${git:sha1}
  branch: ${git:branch}
  message: ${git:message}
  stage: ${opt:stage}
"#;
    let (mut host, plugin) = setup(&repo, yaml);

    host.run_command(HostCommand::Print).await.unwrap();

    let custom = &host.service().custom;
    assert_eq!(custom["describe"], json!(format!("my_tag-1-g{short}")));
    assert_eq!(custom["describe2"], json!(format!("my_tag-1-g{short}")));
    assert_eq!(custom["sha1"], json!(short));
    assert_eq!(custom["branch"], "another_branch");
    assert_eq!(custom["message"], "Another commit");
    assert_eq!(custom["stage"], "prod");

    // No functions, so only the five placeholders reached git
    assert_eq!(plugin.cache().stats().misses, 5);
}

#[tokio::test]
async fn test_package_exports_into_functions() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let short = repo.git().short_head().unwrap();
    let long = repo.git().rev_parse_head().unwrap();
    let (mut host, plugin) = setup(&repo, ServiceFixture::two_functions());

    host.run_command(HostCommand::Package).await.unwrap();

    let service = host.service();
    assert_eq!(service.custom["banner"], json!(format!("build {short} on dev")));

    let hello = service.function("hello").unwrap();
    let env = hello.environment.as_ref().unwrap();
    assert_eq!(env["GIT_COMMIT_SHORT"], short);
    assert_eq!(env["GIT_COMMIT_LONG"], long);
    assert_eq!(env["GIT_BRANCH"], "another_branch");
    assert_eq!(env["GIT_IS_DIRTY"], "false");
    assert_eq!(env["GIT_REPOSITORY"], repo.dir_name());
    assert_eq!(env["GIT_TAGS"], short);
    assert_eq!(hello.tags.as_ref().unwrap(), env);

    let world = service.function("world").unwrap();
    assert_eq!(world.environment.as_ref().unwrap()["GIT_BRANCH"], "pinned");
    assert_eq!(world.tags.as_ref().unwrap()["GIT_BRANCH"], "pinned");
    assert_eq!(world.environment.as_ref().unwrap()["GIT_COMMIT_SHORT"], short);

    // sha1 and describe from placeholders, the six exports share sha1
    let stats = plugin.cache().stats();
    assert_eq!(stats.misses, 7);
    assert_eq!(stats.entries, 7);
    assert_eq!(plugin.cache().get(GitQuery::Describe), Some(format!("my_tag-1-g{short}")));
}

#[tokio::test]
async fn test_allowlists_restrict_each_map() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let yaml = r#"service: my-service
custom:
  gitVariablesEnvWhitelist: [GIT_BRANCH]
  gitVariablesTagsWhitelist: [GIT_BRANCH, GIT_IS_DIRTY]
functions:
  hello:
    handler: handler.hello
"#;
    let (mut host, plugin) = setup(&repo, yaml);

    host.run_command(HostCommand::Package).await.unwrap();

    let hello = host.service().function("hello").unwrap();
    let env = hello.environment.as_ref().unwrap();
    let tags = hello.tags.as_ref().unwrap();
    assert_eq!(env.keys().collect::<Vec<_>>(), ["GIT_BRANCH"]);
    assert_eq!(tags.keys().collect::<Vec<_>>(), ["GIT_BRANCH", "GIT_IS_DIRTY"]);

    assert_eq!(plugin.cache().stats().misses, 2);
}

#[tokio::test]
async fn test_offline_exports_once_per_query() {
    init_test_logging(None);
    let repo = GitRepoFixture::single_commit().unwrap();
    let (mut host, plugin) = setup(&repo, ServiceFixture::two_functions());

    host.run_command(HostCommand::Offline).await.unwrap();
    let first = host.service().clone();
    host.run_command(HostCommand::Offline).await.unwrap();

    assert_eq!(host.service(), &first);
    assert_eq!(plugin.cache().stats().misses, 7);
}

#[tokio::test]
async fn test_disabled_export_leaves_functions_untouched() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let yaml = r#"service: my-service
custom:
  exportGitVariables: false
  sha: ${git:sha1}
functions:
  hello:
    handler: handler.hello
"#;
    let (mut host, plugin) = setup(&repo, yaml);

    host.run_command(HostCommand::Package).await.unwrap();

    let hello = host.service().function("hello").unwrap();
    assert!(hello.environment.is_none());
    assert!(hello.tags.is_none());
    assert_eq!(host.service().custom["sha"], json!(repo.git().short_head().unwrap()));
    assert_eq!(plugin.cache().stats().misses, 1);
}

#[tokio::test]
async fn test_empty_repository_aborts_package() {
    init_test_logging(None);
    let repo = GitRepoFixture::empty().unwrap();
    let (mut host, _plugin) = setup(&repo, ServiceFixture::two_functions());

    let err = host.run_command(HostCommand::Package).await.unwrap_err();
    assert!(err.to_string().starts_with("Command failed: git"), "{err}");

    // Population failed, so the document still holds its placeholders
    assert_eq!(host.service().custom["sha"], "${git:sha1}");
    assert!(host.service().function("hello").unwrap().environment.is_none());
}

#[tokio::test]
async fn test_resolve_text_through_host() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let short = repo.git().short_head().unwrap();
    let (host, _plugin) = setup(&repo, ServiceFixture::two_functions());

    assert_eq!(host.resolve("git:branch").await.unwrap(), "another_branch");
    assert_eq!(
        host.resolve_text("${self:custom.stage}-${git:sha1}").await.unwrap(),
        json!(format!("dev-{short}"))
    );
    // A self reference to a field holding a placeholder settles too
    assert_eq!(host.resolve_text("self:custom.sha").await.unwrap(), json!(short));
}
