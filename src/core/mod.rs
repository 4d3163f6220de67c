//! Core types for git-variables
//!
//! The error taxonomy shared by every layer: the query catalog, the metadata
//! provider, the resolution cache, the resolver chain, the export engine and the
//! CLI all report failures as [`GitVarsError`] wrapped in [`anyhow::Error`].
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use git_variables::core::{GitVarsError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn lookup() -> Result<String> {
//!     Err(GitVarsError::UnknownVariable {
//!         variable: "sha".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = lookup() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, GitVarsError, user_friendly_error};
