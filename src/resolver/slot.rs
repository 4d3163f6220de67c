//! The host's single resolution entry point.

use anyhow::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::VariableResolver;

/// Shared handle to a resolver in the chain.
pub type SharedResolver = Arc<dyn VariableResolver>;

/// Holds the active resolver and lets components interpose in front of it.
pub struct ResolverSlot {
    current: SharedResolver,
    installed: usize,
}

impl fmt::Debug for ResolverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverSlot").field("installed", &self.installed).finish_non_exhaustive()
    }
}

impl ResolverSlot {
    /// Slot whose entry point is the host's own `base` resolver.
    pub fn new(base: SharedResolver) -> Self {
        Self {
            current: base,
            installed: 0,
        }
    }

    /// Replace the entry point with `wrap(prior)`.
    ///
    /// `wrap` receives the resolver that was active until now and must return
    /// the resolver that takes its place; it is called exactly once.
    pub fn install<F>(&mut self, wrap: F)
    where
        F: FnOnce(SharedResolver) -> SharedResolver,
    {
        let prior = Arc::clone(&self.current);
        self.current = wrap(prior);
        self.installed += 1;
        tracing::debug!("Installed resolver interceptor #{}", self.installed);
    }

    /// The active entry point.
    pub fn current(&self) -> SharedResolver {
        Arc::clone(&self.current)
    }

    /// Number of interceptors installed in front of the base resolver.
    pub const fn installed(&self) -> usize {
        self.installed
    }

    /// Resolve through the active entry point.
    pub async fn resolve(&self, expression: &str) -> Result<Value> {
        self.current.resolve(expression).await
    }
}
