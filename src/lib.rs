//! git-variables - lazy, cached git metadata for service configuration
//!
//! A service document (for example `serverless.yml`) contains placeholders such
//! as `${git:sha1}` next to the host's own `${self:...}`, `${env:...}` and
//! `${opt:...}` references. This crate resolves the `git:` namespace by running
//! read-only git queries, caches each answer for the lifetime of the resolver,
//! and exports a fixed set of `GIT_*` variables into every function's
//! `environment` and `tags` maps without overwriting what the document already
//! defines.
//!
//! # Architecture Overview
//!
//! ```text
//! ResolverSlot ──► GitVariableResolver ──► ResolutionCache ──► MetadataProvider
//!                       │ (non-git)              ▲                 (git CLI)
//!                       ▼                        │
//!                  HostResolver           export_all (hooks)
//! ```
//!
//! - Placeholder population and bulk export share one [`cache::ResolutionCache`],
//!   so a value is computed at most once and both paths always agree.
//! - Failed queries are never cached; the next request runs git again.
//! - Unknown query names fail before any process is started, with the full
//!   catalog in the message.
//!
//! # Core Modules
//!
//! ## Git Metadata
//! - [`git`] - query catalog, provider trait and the git CLI provider
//! - [`cache`] - per-instance resolution cache with per-key locking
//! - [`resolver`] - resolver trait, resolution slot and the `git:` decorator
//!
//! ## Host Integration
//! - [`service`] - service document model, settings and placeholder population
//! - [`host`] - lifecycle events, plugins and command flow
//! - [`plugin`] - export table, export engine and plugin registration
//!
//! ## Supporting Modules
//! - [`cli`] - the `gitvars` command line
//! - [`core`] - error types and user-facing error rendering
//! - [`constants`] - prefixes, separators, keys and defaults
//! - [`utils`] - repository discovery and file helpers
//!
//! # Document Example
//!
//! ```yaml
//! service: my-service
//! custom:
//!   release: ${git:describe}
//!   gitVariablesEnvWhitelist: [GIT_COMMIT_SHORT, GIT_BRANCH]
//! functions:
//!   hello:
//!     handler: handler.hello
//!     environment:
//!       BUILD: build-${git:sha1}
//! ```
//!
//! After `gitvars package`, `hello.environment` also carries `GIT_COMMIT_SHORT`
//! and `GIT_BRANCH`, and `hello.tags` carries all six `GIT_*` variables.
//!
//! # Command Line
//!
//! ```bash
//! gitvars resolve sha1 branch
//! gitvars print --format json
//! gitvars package --output .build/service.json
//! gitvars offline
//! gitvars queries
//! ```

// Git metadata
pub mod cache;
pub mod git;
pub mod resolver;

// Host integration
pub mod host;
pub mod plugin;
pub mod service;

// Supporting modules
pub mod cli;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
