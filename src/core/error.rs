//! Error handling for git-variables
//!
//! This module provides the error types and user-friendly error reporting for the
//! resolver, the export engine, and the `gitvars` CLI. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** so callers can tell an unknown variable from a failed
//!    git invocation
//! 2. **Root causes stay visible**: git's own diagnostic text is carried verbatim,
//!    never replaced by a generic "internal error"
//!
//! # Error Categories
//!
//! - **Catalog**: [`GitVarsError::UnknownVariable`] - terminal, never retried
//! - **Provider failures**: [`GitVarsError::GitCommandError`], [`GitVarsError::GitNotFound`],
//!   [`GitVarsError::GitRepoInvalid`] - not cached, retryable on the next request
//! - **Timeouts**: [`GitVarsError::GitTimeout`] - a provider failure subtype
//! - **Host document**: [`GitVarsError::InvalidPlaceholder`], [`GitVarsError::UnknownSource`],
//!   [`GitVarsError::UnresolvedReference`], [`GitVarsError::ConfigError`],
//!   [`GitVarsError::ServiceParseError`]
//!
//! Library functions return [`anyhow::Result`] with a [`GitVarsError`] at the root so
//! callers can `downcast_ref::<GitVarsError>()`. Use [`user_friendly_error`] to turn any
//! error into a colored message with details and a suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use git_variables::core::{GitVarsError, user_friendly_error};
//!
//! let error = GitVarsError::UnknownVariable {
//!     variable: "sha".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // suggests 'sha1'
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::git::GitQuery;

/// The main error type for git-variables operations
///
/// Provider failures carry the exact stderr of the failing git command so that a
/// missing binary, a detached or empty repository, or a directory that is not a
/// repository at all is visible to the user as git reported it.
#[derive(Error, Debug)]
pub enum GitVarsError {
    /// Requested variable is not in the closed query catalog.
    ///
    /// The message enumerates the catalog so host error output is self-documenting.
    #[error("Git variable {variable} is unknown. Candidates are {}", GitQuery::catalog_list())]
    UnknownVariable {
        /// The key that was requested after stripping the `git:` prefix
        variable: String,
    },

    /// A git command exited with a non-zero status
    ///
    /// # Fields
    /// - `command`: The git argument vector as it was run (e.g. "describe --always")
    /// - `stderr`: The diagnostic output of the command, verbatim
    #[error("Command failed: git {command}\n{stderr}")]
    GitCommandError {
        /// The git arguments that were executed
        command: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH: {diagnostic}")]
    GitNotFound {
        /// The operating system's spawn error
        diagnostic: String,
    },

    /// The working directory is not inside a git repository
    #[error("Not a git repository: {path}\n{stderr}")]
    GitRepoInvalid {
        /// The directory the query ran in
        path: String,
        /// The error output from the git command
        stderr: String,
    },

    /// A git command exceeded its bounded wait
    #[error("Command timed out after {timeout_ms}ms: git {command}")]
    GitTimeout {
        /// The git arguments that were executed
        command: String,
        /// The bound that was exceeded
        timeout_ms: u128,
    },

    /// A `${...}` expression could not be parsed
    #[error("Invalid variable expression '{expression}': {reason}")]
    InvalidPlaceholder {
        /// The raw expression
        expression: String,
        /// Why it was rejected
        reason: String,
    },

    /// No resolver in the chain handles this variable source
    #[error("Unknown variable source '{source_name}' in '{expression}'")]
    UnknownSource {
        /// The source token before the separator (e.g. "ssm")
        source_name: String,
        /// The full expression
        expression: String,
    },

    /// A reference points at nothing, or references never settle
    #[error("Could not resolve '{expression}': {reason}")]
    UnresolvedReference {
        /// The expression that failed
        expression: String,
        /// Why it failed
        reason: String,
    },

    /// Host configuration has the wrong shape
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The service document could not be parsed
    #[error("Invalid service file {file}: {reason}")]
    ServiceParseError {
        /// Path to the document
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl GitVarsError {
    /// Returns `true` for failures of the external metadata query itself.
    ///
    /// These are never cached and may succeed on a later request.
    #[must_use]
    pub const fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::GitCommandError { .. }
                | Self::GitNotFound { .. }
                | Self::GitRepoInvalid { .. }
                | Self::GitTimeout { .. }
        )
    }

    /// Returns `true` if the error is a query timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::GitTimeout { .. })
    }
}

impl Clone for GitVarsError {
    fn clone(&self) -> Self {
        match self {
            Self::UnknownVariable {
                variable,
            } => Self::UnknownVariable {
                variable: variable.clone(),
            },
            Self::GitCommandError {
                command,
                stderr,
            } => Self::GitCommandError {
                command: command.clone(),
                stderr: stderr.clone(),
            },
            Self::GitNotFound {
                diagnostic,
            } => Self::GitNotFound {
                diagnostic: diagnostic.clone(),
            },
            Self::GitRepoInvalid {
                path,
                stderr,
            } => Self::GitRepoInvalid {
                path: path.clone(),
                stderr: stderr.clone(),
            },
            Self::GitTimeout {
                command,
                timeout_ms,
            } => Self::GitTimeout {
                command: command.clone(),
                timeout_ms: *timeout_ms,
            },
            Self::InvalidPlaceholder {
                expression,
                reason,
            } => Self::InvalidPlaceholder {
                expression: expression.clone(),
                reason: reason.clone(),
            },
            Self::UnknownSource {
                source_name,
                expression,
            } => Self::UnknownSource {
                source_name: source_name.clone(),
                expression: expression.clone(),
            },
            Self::UnresolvedReference {
                expression,
                reason,
            } => Self::UnresolvedReference {
                expression: expression.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::ServiceParseError {
                file,
                reason,
            } => Self::ServiceParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::YamlError(e) => Self::Other {
                message: format!("YAML error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show the main message in red, then optional details in
/// yellow and an optional suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: GitVarsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: GitVarsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`GitVarsError`] anywhere in the chain (so `.context(...)` wrappers do
/// not hide it) and falls back to the full error chain for anything else.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(gv_error) = error.chain().find_map(|e| e.downcast_ref::<GitVarsError>()) {
        return create_error_context(gv_error.clone());
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(GitVarsError::Other {
        message,
    })
}

/// Closest catalog entry to an unknown variable name, if any is plausibly close.
fn closest_query(variable: &str) -> Option<&'static str> {
    GitQuery::ALL
        .iter()
        .map(|q| {
            let distance =
                strsim::levenshtein(&variable.to_lowercase(), &q.as_str().to_lowercase());
            (q.as_str(), distance)
        })
        .filter(|(_, distance)| *distance <= 3)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}

fn create_error_context(error: GitVarsError) -> ErrorContext {
    match &error {
        GitVarsError::UnknownVariable { variable } => {
            let suggestion = match closest_query(variable) {
                Some(name) => format!("Did you mean '${{git:{name}}}'?"),
                None => "Use one of the listed candidates, e.g. '${git:sha1}'".to_string(),
            };
            ErrorContext::new(error.clone()).with_suggestion(suggestion)
        }

        GitVarsError::GitNotFound { .. } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Install git from https://git-scm.com/ or your package manager \
                 (e.g., 'brew install git', 'apt install git')",
            )
            .with_details(
                "git variables are read by running the git executable in the service directory",
            ),

        GitVarsError::GitRepoInvalid { path, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Run from inside a git checkout, or pass --repo-dir pointing at one \
                 (looked in {path})"
            )),

        GitVarsError::GitCommandError { command, .. } => ErrorContext::new(error.clone())
            .with_suggestion(match command.as_str() {
                c if c.starts_with("describe") => {
                    "'git describe' needs at least one commit. Commit first, or use ${git:sha1}"
                }
                c if c.starts_with("config") => {
                    "Set the value with 'git config user.name' / 'git config user.email'"
                }
                _ => "Run the git command manually in the repository for more details",
            }),

        GitVarsError::GitTimeout { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Raise the bound with --timeout-ms or GITVARS_TIMEOUT_MS")
            .with_details(
                "Each git query is bounded; a timed-out query is not cached and is not retried",
            ),

        GitVarsError::UnknownSource { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Supported sources are 'git:', 'self:', 'env:' and 'opt:'"),

        _ => ErrorContext::new(error.clone()),
    }
}
