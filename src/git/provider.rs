//! Metadata providers: the strategy that evaluates a [`GitQuery`].
//!
//! A provider executes exactly one deterministic, read-only operation per query and
//! returns a single string. [`GitCliProvider`] runs the system `git` binary; other
//! strategies (an in-process repository reader, a test double) implement
//! [`MetadataProvider`] with the same result semantics.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::command_builder::GitCommand;
use super::query::GitQuery;
use crate::constants::{DEFAULT_QUERY_TIMEOUT, TAG_SEPARATOR};

/// Evaluates catalog queries against the current repository state.
///
/// Failures are returned as [`GitVarsError`](crate::core::GitVarsError) provider
/// failures carrying git's diagnostic text unmodified.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Evaluate `query` and return its string value.
    async fn query(&self, query: GitQuery) -> Result<String>;

    /// Short name of the strategy, used in log messages.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Provider backed by the system `git` executable.
///
/// # Examples
///
/// ```rust,no_run
/// use git_variables::git::{GitCliProvider, GitQuery, MetadataProvider};
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let provider = GitCliProvider::new()
///     .with_repo_dir("/path/to/service")
///     .with_timeout(Duration::from_secs(2));
/// let branch = provider.query(GitQuery::Branch).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitCliProvider {
    repo_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for GitCliProvider {
    fn default() -> Self {
        Self {
            repo_dir: None,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl GitCliProvider {
    /// Provider that runs git in the current directory with the default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git in `dir` instead of the process's current directory.
    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(dir.into());
        self
    }

    /// Bound each git invocation by `timeout`.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The directory git runs in, if one was set.
    pub fn repo_dir(&self) -> Option<&Path> {
        self.repo_dir.as_deref()
    }

    /// The per-invocation bound.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, query: GitQuery) -> GitCommand {
        let cmd = GitCommand::new()
            .args(query.git_args().iter().copied())
            .with_timeout(Some(self.timeout))
            .with_context(query.as_str());
        match &self.repo_dir {
            Some(dir) => cmd.current_dir(dir),
            None => cmd,
        }
    }

    async fn run(&self, query: GitQuery) -> Result<String> {
        self.command(query).execute_stdout().await
    }
}

#[async_trait]
impl MetadataProvider for GitCliProvider {
    async fn query(&self, query: GitQuery) -> Result<String> {
        match query {
            GitQuery::IsDirty => {
                let changes = self.run(query).await?;
                Ok((!changes.trim().is_empty()).to_string())
            }
            GitQuery::Repository => {
                let top_level = self.run(query).await?;
                Ok(base_name(&top_level))
            }
            GitQuery::Tags => {
                let tags = join_tags(&self.run(query).await?);
                if tags.is_empty() {
                    // Never export an empty tag list while a revision exists
                    self.run(GitQuery::Sha1).await
                } else {
                    Ok(tags)
                }
            }
            _ => self.run(query).await,
        }
    }

    fn name(&self) -> &str {
        "git-cli"
    }
}

/// Last path segment of `path`, or `path` itself when it has none.
fn base_name(path: &str) -> String {
    Path::new(path.trim())
        .file_name()
        .map_or_else(|| path.trim().to_string(), |name| name.to_string_lossy().into_owned())
}

/// One tag per line, joined with [`TAG_SEPARATOR`] in listing order.
fn join_tags(listing: &str) -> String {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR)
}
