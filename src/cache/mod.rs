//! Per-instance resolution cache for git metadata.
//!
//! The cache maps each [`GitQuery`] to the string its provider returned the first
//! time it was asked. Entries are populated lazily, never evicted, and live exactly as
//! long as the cache (one cache per resolver instance, never shared between
//! independent instances).
//!
//! # Guarantees
//!
//! - **At most one external query per name**: concurrent requests for the same
//!   uncached query serialize on a per-key lock; the second caller finds the value
//!   the first one stored.
//! - **Failures are not memoized**: a failed provider call stores nothing, so the next
//!   request for that name re-runs the query.
//! - **Staleness is accepted**: once stored, a value is never recomputed even if the
//!   repository changes mid-process.
//! - **No suspension on hits**: [`ResolutionCache::get`] and the fast path of
//!   [`ResolutionCache::get_or_compute`] never await.
//!
//! # Concurrency
//!
//! Values live in a [`DashMap`] for lock-free reads. Each query also gets an
//! `Arc<Mutex<()>>` in a second map; only callers that miss take that lock, and the
//! value is re-checked after acquiring it.
//!
//! # Example
//!
//! ```rust,no_run
//! use git_variables::cache::ResolutionCache;
//! use git_variables::git::{GitCliProvider, GitQuery};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = ResolutionCache::new(Arc::new(GitCliProvider::new()));
//! let first = cache.get_or_compute(GitQuery::Sha1).await?; // runs git
//! let second = cache.get_or_compute(GitQuery::Sha1).await?; // cached
//! assert_eq!(first, second);
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::git::{GitQuery, MetadataProvider};

/// Hit/miss counters for a [`ResolutionCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Requests answered from the cache
    pub hits: usize,
    /// Requests that reached the provider
    pub misses: usize,
    /// Number of stored values
    pub entries: usize,
}

/// Memo table from [`GitQuery`] to its resolved value, backed by a provider.
pub struct ResolutionCache {
    provider: Arc<dyn MetadataProvider>,
    values: DashMap<GitQuery, String>,
    /// Per-query locks serializing provider calls for the same name
    locks: DashMap<GitQuery, Arc<Mutex<()>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("provider", &self.provider.name())
            .field("entries", &self.values.len())
            .finish_non_exhaustive()
    }
}

impl ResolutionCache {
    /// Create an empty cache in front of `provider`.
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            values: DashMap::new(),
            locks: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Return the cached value for `query`, computing it on first use.
    ///
    /// # Errors
    ///
    /// Provider errors are returned unmodified and leave the cache unchanged.
    pub async fn get_or_compute(&self, query: GitQuery) -> Result<String> {
        if let Some(value) = self.get(query) {
            return Ok(value);
        }

        let lock = self.locks.entry(query).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        let _guard = lock.lock().await;

        // Another caller may have stored the value while we waited
        if let Some(value) = self.get(query) {
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            target: "git_variables::cache",
            "Resolving git:{} via {} provider",
            query,
            self.provider.name()
        );

        match self.provider.query(query).await {
            Ok(value) => {
                self.values.insert(query, value.clone());
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(target: "git_variables::cache", "git:{} failed, not cached", query);
                Err(e)
            }
        }
    }

    /// Cached value for `query`, without touching the provider.
    pub fn get(&self, query: GitQuery) -> Option<String> {
        let value = self.values.get(&query).map(|entry| entry.value().clone());
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Store a value computed elsewhere.
    ///
    /// An existing entry is kept: once a query has a value it is immutable for the
    /// lifetime of the cache. Returns `true` if `value` was stored.
    pub fn insert(&self, query: GitQuery, value: impl Into<String>) -> bool {
        let mut stored = false;
        self.values.entry(query).or_insert_with(|| {
            stored = true;
            value.into()
        });
        stored
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.values.len(),
        }
    }

    /// The provider behind this cache.
    pub fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }
}
