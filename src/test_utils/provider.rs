//! In-memory metadata provider that counts external queries.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::GitVarsError;
use crate::git::{GitQuery, MetadataProvider};

/// Provider double with canned values, injected failures and per-query call counts.
///
/// # Example
///
/// ```rust,no_run
/// use git_variables::git::GitQuery;
/// use git_variables::test_utils::CountingProvider;
///
/// let provider = CountingProvider::new()
///     .with_value(GitQuery::Sha1, "90440bd")
///     .failing(GitQuery::Describe, 1);
/// assert_eq!(provider.total_calls(), 0);
/// ```
#[derive(Debug, Default)]
pub struct CountingProvider {
    values: HashMap<GitQuery, String>,
    failures: DashMap<GitQuery, usize>,
    calls: DashMap<GitQuery, usize>,
    delay: Option<Duration>,
}

impl CountingProvider {
    /// Provider with no values; every query fails until configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned value for `query`.
    pub fn with_value(mut self, query: GitQuery, value: impl Into<String>) -> Self {
        self.values.insert(query, value.into());
        self
    }

    /// Values for the typical `another_branch` checkout used across tests.
    pub fn with_defaults(self) -> Self {
        self.with_value(GitQuery::Describe, "my_tag-1-g90440bd")
            .with_value(GitQuery::DescribeLight, "my_tag-1-g90440bd")
            .with_value(GitQuery::Sha1, "90440bd")
            .with_value(GitQuery::Commit, "90440bd1c1c4d2d8a0e5c5d1f37c2b1a3e4f5a6b")
            .with_value(GitQuery::Branch, "another_branch")
            .with_value(GitQuery::Message, "Another commit")
            .with_value(GitQuery::MessageSubject, "Another commit")
            .with_value(GitQuery::MessageBody, "")
            .with_value(GitQuery::User, "Test User")
            .with_value(GitQuery::Email, "test@gitvars.example")
            .with_value(GitQuery::IsDirty, "false")
            .with_value(GitQuery::Repository, "my-service")
            .with_value(GitQuery::Tags, "90440bd")
    }

    /// Fail the next `times` calls for `query`.
    pub fn failing(self, query: GitQuery, times: usize) -> Self {
        self.failures.insert(query, times);
        self
    }

    /// Sleep before answering, to widen race windows.
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `query` reached this provider.
    pub fn calls(&self, query: GitQuery) -> usize {
        self.calls.get(&query).map_or(0, |c| *c)
    }

    /// Total number of provider calls.
    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }
}

#[async_trait]
impl MetadataProvider for CountingProvider {
    async fn query(&self, query: GitQuery) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        *self.calls.entry(query).or_insert(0) += 1;

        let should_fail = match self.failures.get_mut(&query) {
            Some(mut remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };

        if should_fail {
            return Err(GitVarsError::GitCommandError {
                command: query.git_args().join(" "),
                stderr: "fatal: simulated failure".to_string(),
            }
            .into());
        }

        self.values.get(&query).cloned().ok_or_else(|| {
            GitVarsError::GitCommandError {
                command: query.git_args().join(" "),
                stderr: format!("fatal: no value configured for {query}"),
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        "counting"
    }
}
