//! The closed catalog of git metadata queries.
//!
//! Every `${git:<name>}` placeholder names one [`GitQuery`]. The catalog is closed:
//! a name outside it is an [`GitVarsError::UnknownVariable`] error, never a silent
//! default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::GitVarsError;

/// A named request for one piece of repository metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GitQuery {
    /// `git describe --always`
    #[serde(rename = "describe")]
    Describe,
    /// `git describe --always --tags` (lightweight tags included)
    #[serde(rename = "describeLight")]
    DescribeLight,
    /// Abbreviated revision hash of HEAD
    #[serde(rename = "sha1")]
    Sha1,
    /// Full revision hash of HEAD
    #[serde(rename = "commit")]
    Commit,
    /// Symbolic name of the current branch (`HEAD` when detached)
    #[serde(rename = "branch")]
    Branch,
    /// Full message of the latest commit
    #[serde(rename = "message")]
    Message,
    /// Subject line of the latest commit
    #[serde(rename = "messageSubject")]
    MessageSubject,
    /// Body of the latest commit message
    #[serde(rename = "messageBody")]
    MessageBody,
    /// Configured `user.name`
    #[serde(rename = "user")]
    User,
    /// Configured `user.email`
    #[serde(rename = "email")]
    Email,
    /// `"true"` when the working tree differs from the index, otherwise `"false"`.
    ///
    /// Staged changes are not counted: a tree whose edits are all in the index
    /// reports `"false"`, as do untracked files.
    #[serde(rename = "isDirty")]
    IsDirty,
    /// Base name of the repository's top-level directory
    #[serde(rename = "repository")]
    Repository,
    /// Tags pointing at HEAD joined by `::`, or the short hash when there are none
    #[serde(rename = "tags")]
    Tags,
}

impl GitQuery {
    /// The full catalog in canonical order.
    pub const ALL: [Self; 13] = [
        Self::Describe,
        Self::DescribeLight,
        Self::Sha1,
        Self::Commit,
        Self::Branch,
        Self::Message,
        Self::MessageSubject,
        Self::MessageBody,
        Self::User,
        Self::Email,
        Self::IsDirty,
        Self::Repository,
        Self::Tags,
    ];

    /// The catalog name used in placeholders.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Describe => "describe",
            Self::DescribeLight => "describeLight",
            Self::Sha1 => "sha1",
            Self::Commit => "commit",
            Self::Branch => "branch",
            Self::Message => "message",
            Self::MessageSubject => "messageSubject",
            Self::MessageBody => "messageBody",
            Self::User => "user",
            Self::Email => "email",
            Self::IsDirty => "isDirty",
            Self::Repository => "repository",
            Self::Tags => "tags",
        }
    }

    /// The git argument vector that computes this query.
    ///
    /// `IsDirty`, `Repository` and `Tags` post-process the output; see
    /// [`GitCliProvider`](crate::git::GitCliProvider).
    #[must_use]
    pub const fn git_args(self) -> &'static [&'static str] {
        match self {
            Self::Describe => &["describe", "--always"],
            Self::DescribeLight => &["describe", "--always", "--tags"],
            Self::Sha1 => &["rev-parse", "--short", "HEAD"],
            Self::Commit => &["rev-parse", "HEAD"],
            Self::Branch => &["rev-parse", "--abbrev-ref", "HEAD"],
            Self::Message => &["log", "-1", "--pretty=%B"],
            Self::MessageSubject => &["log", "-1", "--pretty=%s"],
            Self::MessageBody => &["log", "-1", "--pretty=%b"],
            Self::User => &["config", "user.name"],
            Self::Email => &["config", "user.email"],
            Self::IsDirty => &["diff", "--stat"],
            Self::Repository => &["rev-parse", "--show-toplevel"],
            Self::Tags => &["tag", "--points-at", "HEAD"],
        }
    }

    /// Quoted, comma-separated catalog, e.g. `'describe', 'describeLight', ...`.
    #[must_use]
    pub fn catalog_list() -> String {
        Self::ALL.iter().map(|q| format!("'{}'", q.as_str())).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for GitQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GitQuery {
    type Err = GitVarsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|q| q.as_str() == s).ok_or_else(|| {
            GitVarsError::UnknownVariable {
                variable: s.to_string(),
            }
        })
    }
}
