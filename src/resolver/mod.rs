//! Variable resolution for placeholder expressions.
//!
//! A host document contains placeholders such as `${git:sha1}` or
//! `${self:custom.stage}`. The host hands the inner expression (`git:sha1`) to a
//! single resolution entry point, the [`ResolverSlot`]. Components that own a
//! namespace install themselves into the slot as decorators around whatever was
//! there before, so the host always sees exactly one resolver.
//!
//! # Chaining
//!
//! ```text
//! ResolverSlot::current()
//!   └── GitVariableResolver      handles "git:*"
//!         └── (prior resolver)   everything else, unchanged
//! ```
//!
//! Installing twice produces two links; the last installed intercepts first.
//!
//! # Example
//!
//! ```rust,no_run
//! use git_variables::cache::ResolutionCache;
//! use git_variables::git::GitCliProvider;
//! use git_variables::resolver::{GitVariableResolver, ResolverSlot, VariableResolver};
//! use git_variables::service::HostResolver;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut slot = ResolverSlot::new(Arc::new(HostResolver::default()));
//! let cache = Arc::new(ResolutionCache::new(Arc::new(GitCliProvider::new())));
//! slot.install(|prior| Arc::new(GitVariableResolver::new(cache, prior)));
//!
//! let sha = slot.resolve("git:sha1").await?;
//! # Ok(())
//! # }
//! ```

mod git;
mod slot;

pub use git::{GitVariableResolver, git_key};
pub use slot::{ResolverSlot, SharedResolver};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Resolves one placeholder expression (without `${` `}`) to a value.
///
/// Values are JSON so a placeholder can stand for a string, a number, or a whole
/// sub-document, as the host's own `self:` references can.
#[async_trait]
pub trait VariableResolver: Send + Sync {
    /// Resolve `expression`, e.g. `git:branch` or `self:custom.stage`.
    async fn resolve(&self, expression: &str) -> Result<Value>;
}
