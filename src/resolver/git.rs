//! Resolver for the `git:` namespace.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::{SharedResolver, VariableResolver};
use crate::cache::ResolutionCache;
use crate::constants::{GIT_PREFIX, PREFIX_SEPARATOR};
use crate::git::GitQuery;

/// Query name carried by `expression` if it is in the `git:` namespace.
///
/// ```rust
/// use git_variables::resolver::git_key;
///
/// assert_eq!(git_key("git:sha1"), Some("sha1"));
/// assert_eq!(git_key("self:custom.stage"), None);
/// assert_eq!(git_key("github:token"), None);
/// ```
pub fn git_key(expression: &str) -> Option<&str> {
    expression.strip_prefix(GIT_PREFIX)?.strip_prefix(PREFIX_SEPARATOR)
}

/// Decorator that answers `git:<query>` from a [`ResolutionCache`] and forwards
/// every other expression, unmodified, to the resolver it was installed over.
pub struct GitVariableResolver {
    cache: Arc<ResolutionCache>,
    fallback: SharedResolver,
}

impl fmt::Debug for GitVariableResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitVariableResolver").field("cache", &self.cache).finish_non_exhaustive()
    }
}

impl GitVariableResolver {
    /// Wrap `fallback`, answering git queries from `cache`.
    pub fn new(cache: Arc<ResolutionCache>, fallback: SharedResolver) -> Self {
        Self {
            cache,
            fallback,
        }
    }

    /// The cache shared with the export engine.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Resolve a bare query name such as `sha1`.
    ///
    /// # Errors
    ///
    /// Names outside the catalog fail with
    /// [`GitVarsError::UnknownVariable`](crate::core::GitVarsError::UnknownVariable)
    /// before any git process is started. Provider failures pass through unchanged.
    pub async fn resolve_query(&self, name: &str) -> Result<String> {
        let query: GitQuery = name.parse()?;
        self.cache.get_or_compute(query).await
    }
}

#[async_trait]
impl VariableResolver for GitVariableResolver {
    async fn resolve(&self, expression: &str) -> Result<Value> {
        match git_key(expression) {
            Some(name) => Ok(Value::String(self.resolve_query(name).await?)),
            None => self.fallback.resolve(expression).await,
        }
    }
}
