//! Test utilities for git-variables
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`CountingProvider`] - in-memory provider that counts external queries
//! - [`TestGit`] - git runner with an isolated configuration
//! - [`GitRepoFixture`] - real repositories in temporary directories
//! - [`ServiceFixture`] - sample service documents
//!
//! # Example
//!
//! ```rust,no_run
//! use git_variables::test_utils::GitRepoFixture;
//!
//! let repo = GitRepoFixture::tagged_branch().unwrap();
//! assert!(repo.path().join(".git").exists());
//! ```

pub mod fixtures;
pub mod git_helper;
pub mod provider;

pub use fixtures::{GitRepoFixture, ServiceFixture};
pub use git_helper::TestGit;
pub use provider::CountingProvider;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=git=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
