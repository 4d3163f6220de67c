//! Catalog queries against real repositories.

use git_variables::cache::ResolutionCache;
use git_variables::core::GitVarsError;
use git_variables::git::{GitCliProvider, GitQuery, MetadataProvider};
use git_variables::test_utils::{GitRepoFixture, init_test_logging};
use std::sync::Arc;
use std::time::Duration;

fn provider(repo: &GitRepoFixture) -> GitCliProvider {
    GitCliProvider::new().with_repo_dir(repo.path()).with_timeout(Duration::from_secs(10))
}

#[tokio::test]
async fn test_revision_queries() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let short = repo.git().short_head().unwrap();
    let long = repo.git().rev_parse_head().unwrap();
    let p = provider(&repo);

    assert_eq!(p.query(GitQuery::Sha1).await.unwrap(), short);
    assert_eq!(p.query(GitQuery::Commit).await.unwrap(), long);
    assert_eq!(p.query(GitQuery::Branch).await.unwrap(), "another_branch");
    assert_eq!(p.query(GitQuery::Describe).await.unwrap(), format!("my_tag-1-g{short}"));
    assert_eq!(p.query(GitQuery::DescribeLight).await.unwrap(), format!("my_tag-1-g{short}"));
}

#[tokio::test]
async fn test_describe_light_sees_lightweight_tags() {
    init_test_logging(None);
    let repo = GitRepoFixture::single_commit().unwrap();
    repo.git().tag("v0.1.0").unwrap();
    let p = provider(&repo);

    assert_eq!(p.query(GitQuery::DescribeLight).await.unwrap(), "v0.1.0");
    // Plain describe ignores lightweight tags and falls back to the hash
    assert_eq!(p.query(GitQuery::Describe).await.unwrap(), repo.git().short_head().unwrap());
}

#[tokio::test]
async fn test_message_queries() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let p = provider(&repo);

    assert_eq!(p.query(GitQuery::Message).await.unwrap(), "Another commit");
    assert_eq!(p.query(GitQuery::MessageSubject).await.unwrap(), "Another commit");
    assert_eq!(p.query(GitQuery::MessageBody).await.unwrap(), "");

    repo.write_file("notes.txt", "more\n").unwrap();
    repo.git().add_all().unwrap();
    repo.git().commit("Subject line\n\nBody paragraph").unwrap();
    assert_eq!(p.query(GitQuery::MessageSubject).await.unwrap(), "Subject line");
    assert_eq!(p.query(GitQuery::MessageBody).await.unwrap(), "Body paragraph");
    assert_eq!(p.query(GitQuery::Message).await.unwrap(), "Subject line\n\nBody paragraph");
}

#[tokio::test]
async fn test_user_queries() {
    init_test_logging(None);
    let repo = GitRepoFixture::single_commit().unwrap();
    let p = provider(&repo);

    assert_eq!(p.query(GitQuery::User).await.unwrap(), "Test User");
    assert_eq!(p.query(GitQuery::Email).await.unwrap(), "test@gitvars.example");
}

#[tokio::test]
async fn test_tags_fall_back_to_short_sha() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    let p = provider(&repo);

    assert_eq!(p.query(GitQuery::Tags).await.unwrap(), repo.git().short_head().unwrap());
}

#[tokio::test]
async fn test_tags_are_joined_in_listing_order() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    repo.git().tag_annotated("tag1", "first").unwrap();
    repo.git().tag_annotated("tag2", "second").unwrap();

    assert_eq!(provider(&repo).query(GitQuery::Tags).await.unwrap(), "tag1::tag2");
}

#[tokio::test]
async fn test_is_dirty_on_fresh_resolver() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();

    let cache = ResolutionCache::new(Arc::new(provider(&repo)));
    assert_eq!(cache.get_or_compute(GitQuery::IsDirty).await.unwrap(), "false");

    repo.write_file("README.md", "# changed\n").unwrap();

    // The existing cache keeps its answer for the rest of its lifetime
    assert_eq!(cache.get_or_compute(GitQuery::IsDirty).await.unwrap(), "false");

    let fresh = ResolutionCache::new(Arc::new(provider(&repo)));
    assert_eq!(fresh.get_or_compute(GitQuery::IsDirty).await.unwrap(), "true");
}

#[tokio::test]
async fn test_untracked_files_do_not_make_tree_dirty() {
    init_test_logging(None);
    let repo = GitRepoFixture::single_commit().unwrap();
    repo.write_file("serverless.yml", "service: svc\n").unwrap();

    assert_eq!(provider(&repo).query(GitQuery::IsDirty).await.unwrap(), "false");
}

#[tokio::test]
async fn test_staged_changes_do_not_make_tree_dirty() {
    init_test_logging(None);
    let repo = GitRepoFixture::single_commit().unwrap();
    repo.write_file("README.md", "# staged\n").unwrap();
    repo.git().add_all().unwrap();

    assert_eq!(provider(&repo).query(GitQuery::IsDirty).await.unwrap(), "false");

    // An unstaged edit on top of the staged one counts
    repo.write_file("README.md", "# staged and edited\n").unwrap();
    assert_eq!(provider(&repo).query(GitQuery::IsDirty).await.unwrap(), "true");
}

#[tokio::test]
async fn test_repository_is_base_name() {
    init_test_logging(None);
    let repo = GitRepoFixture::single_commit().unwrap();
    let p = provider(&repo);

    assert_eq!(p.query(GitQuery::Repository).await.unwrap(), repo.dir_name());

    // Same answer from a subdirectory
    repo.write_file("services/api/handler.js", "\n").unwrap();
    let nested = GitCliProvider::new()
        .with_repo_dir(repo.path().join("services/api"))
        .with_timeout(Duration::from_secs(10));
    assert_eq!(nested.query(GitQuery::Repository).await.unwrap(), repo.dir_name());
}

#[tokio::test]
async fn test_detached_head_branch() {
    init_test_logging(None);
    let repo = GitRepoFixture::tagged_branch().unwrap();
    repo.git().detach().unwrap();

    assert_eq!(provider(&repo).query(GitQuery::Branch).await.unwrap(), "HEAD");
}

#[tokio::test]
async fn test_describe_without_commits_fails_with_git_diagnostic() {
    init_test_logging(None);
    let repo = GitRepoFixture::empty().unwrap();

    let err = provider(&repo).query(GitQuery::Describe).await.unwrap_err();
    assert!(err.to_string().starts_with("Command failed: git describe --always"), "{err}");
    let gv = err.downcast_ref::<GitVarsError>().unwrap();
    assert!(gv.is_provider_failure());
    assert!(!gv.is_timeout());
}

#[tokio::test]
async fn test_failed_query_is_retried_after_repair() {
    init_test_logging(None);
    let repo = GitRepoFixture::empty().unwrap();
    let cache = ResolutionCache::new(Arc::new(provider(&repo)));

    assert!(cache.get_or_compute(GitQuery::Sha1).await.is_err());

    repo.write_file("README.md", "# service\n").unwrap();
    repo.git().add_all().unwrap();
    repo.git().commit("Initial commit").unwrap();

    assert_eq!(
        cache.get_or_compute(GitQuery::Sha1).await.unwrap(),
        repo.git().short_head().unwrap()
    );
}
