//! Repository and service-document fixtures for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use super::git_helper::TestGit;

/// A real git repository in a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct GitRepoFixture {
    dir: TempDir,
    git: TestGit,
}

impl GitRepoFixture {
    /// Initialized repository with a configured user and no commits.
    pub fn empty() -> Result<Self> {
        let dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let git = TestGit::new(dir.path());
        git.init()?;
        git.config_user()?;
        Ok(Self {
            dir,
            git,
        })
    }

    /// Repository with one commit containing `README.md`.
    pub fn single_commit() -> Result<Self> {
        let fixture = Self::empty()?;
        fixture.write_file("README.md", "# service\n")?;
        fixture.git.add_all()?;
        fixture.git.commit("Initial commit")?;
        Ok(fixture)
    }

    /// Repository mirroring a typical release branch:
    ///
    /// - annotated tag `my_tag` on the first commit
    /// - a second commit "Another commit" with no tag
    /// - checked out on branch `another_branch`
    ///
    /// `describe` yields `my_tag-1-g<short sha>`.
    pub fn tagged_branch() -> Result<Self> {
        let fixture = Self::single_commit()?;
        fixture.git.tag_annotated("my_tag", "First release")?;
        fixture.git.create_branch("another_branch")?;
        fixture.write_file("handler.js", "module.exports.hello = () => 'hi'\n")?;
        fixture.git.add_all()?;
        fixture.git.commit("Another commit")?;
        Ok(fixture)
    }

    /// Write a file relative to the repository root.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Repository root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Git runner bound to this repository.
    pub fn git(&self) -> &TestGit {
        &self.git
    }

    /// Base name of the repository directory, as `git:repository` reports it.
    pub fn dir_name(&self) -> String {
        self.dir
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Sample service documents.
pub struct ServiceFixture;

impl ServiceFixture {
    /// Two functions, one of which already defines `GIT_BRANCH` in both maps.
    pub fn two_functions() -> &'static str {
        r#"service: my-service
provider:
  name: aws
  runtime: nodejs18.x
custom:
  stage: dev
  sha: ${git:sha1}
  describe: ${git:describe}
  banner: "build ${git:sha1} on ${self:custom.stage}"
functions:
  hello:
    handler: handler.hello
  world:
    handler: handler.world
    environment:
      GIT_BRANCH: pinned
    tags:
      GIT_BRANCH: pinned
"#
    }
}
