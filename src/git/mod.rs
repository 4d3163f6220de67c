//! Git metadata access
//!
//! This module is the only place that talks to git. Like Cargo's
//! `git-fetch-with-cli`, it runs the system `git` binary rather than an embedded
//! implementation, so the values match what a developer sees in their terminal
//! (same config, same worktree, same tags).
//!
//! # Components
//!
//! - [`GitQuery`] - the closed catalog of queries (`sha1`, `branch`, `tags`, ...)
//! - [`MetadataProvider`] - strategy trait evaluating one query to one string
//! - [`GitCliProvider`] - the subprocess strategy, one bounded `git` call per query
//! - [`GitCommand`] - fluent builder with timeout, logging and error mapping
//!
//! # Read-only Contract
//!
//! Every query is read-only: `describe`, `rev-parse`, `log`, `config <key>`,
//! `diff --stat` and `tag --points-at`. Nothing here mutates the repository.
//!
//! # Example
//!
//! ```rust,no_run
//! use git_variables::git::{GitCliProvider, GitQuery, MetadataProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = GitCliProvider::new();
//! let dirty = provider.query(GitQuery::IsDirty).await?;
//! assert!(dirty == "true" || dirty == "false");
//! # Ok(())
//! # }
//! ```

pub mod command_builder;
pub mod provider;
pub mod query;

pub use command_builder::{GitCommand, GitCommandOutput};
pub use provider::{GitCliProvider, MetadataProvider};
pub use query::GitQuery;
