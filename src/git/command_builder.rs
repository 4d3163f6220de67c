//! Type-safe Git command builder for read-only metadata queries
//!
//! This module provides a fluent API for building and executing Git commands with
//! consistent timeout handling, logging and error mapping. Every metadata query the
//! resolver issues goes through [`GitCommand`].

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::DEFAULT_QUERY_TIMEOUT;
use crate::core::GitVarsError;
use crate::utils::platform::get_git_command;

/// Builder for constructing and executing Git commands with consistent error handling.
///
/// # Examples
///
/// ```rust,no_run
/// use git_variables::git::GitCommand;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let sha = GitCommand::new()
///     .args(["rev-parse", "--short", "HEAD"])
///     .current_dir("/path/to/repo")
///     .with_timeout(Some(Duration::from_secs(2)))
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: [`DEFAULT_QUERY_TIMEOUT`] (1 second)
/// - **Working directory**: Current process directory
/// - **Environment**: Inherits from parent process
///
/// The child process is killed if the command future is dropped, so a timed-out
/// or abandoned query never leaves a git process behind.
#[derive(Debug, Clone)]
pub struct GitCommand {
    /// Command arguments to pass to Git (e.g., ["describe", "--always"])
    args: Vec<String>,

    /// Working directory passed as `-C <dir>` (defaults to current directory)
    current_dir: Option<PathBuf>,

    /// Environment variables to set for the Git process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for command completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional context string for log messages
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            timeout_duration: Some(DEFAULT_QUERY_TIMEOUT),
            context: None,
        }
    }
}

impl GitCommand {
    /// Creates a new Git command builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory for Git command execution.
    ///
    /// Passed to git as `-C <dir>`, which makes the command independent of the
    /// process's current directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument to the Git command.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to the Git command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable for the Git command execution.
    ///
    /// `LC_ALL=C` is a common choice to keep git's output parseable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context for logging (e.g., the query name)
    ///
    /// With context, log messages include the identifier:
    /// ```text
    /// (sha1) Executing command: git -C /path/to/repo rev-parse --short HEAD
    /// ```
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The git arguments without the `-C <dir>` prefix, joined for messages.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }

    fn log_prefix(&self) -> String {
        self.context.as_ref().map(|ctx| format!("({ctx}) ")).unwrap_or_default()
    }

    /// Execute the command and return the output
    ///
    /// # Errors
    ///
    /// - [`GitVarsError::GitNotFound`] if the git executable cannot be spawned
    /// - [`GitVarsError::GitTimeout`] if the bound elapses first
    /// - [`GitVarsError::GitRepoInvalid`] if git reports the directory is not a repository
    /// - [`GitVarsError::GitCommandError`] for any other non-zero exit, with stderr verbatim
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            // Use the path as-is to avoid symlink resolution issues on macOS
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.clone());

        cmd.args(&full_args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        let prefix = self.log_prefix();
        tracing::debug!(
            target: "git",
            "{}Executing command: {} {}",
            prefix,
            git_command,
            full_args.join(" ")
        );

        let spawn_error = |e: std::io::Error| -> anyhow::Error {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitVarsError::GitNotFound {
                    diagnostic: e.to_string(),
                }
                .into()
            } else {
                anyhow::Error::from(e)
                    .context(format!("Failed to execute git {}", full_args.join(" ")))
            }
        };

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result.map_err(spawn_error)?
            } else {
                let timeout_ms = millis_rounded_up(duration);
                tracing::warn!(
                    target: "git",
                    "{}Command timed out after {}ms: git {}",
                    prefix,
                    timeout_ms,
                    full_args.join(" ")
                );
                return Err(GitVarsError::GitTimeout {
                    command: self.command_line(),
                    timeout_ms,
                }
                .into());
            }
        } else {
            tracing::trace!(target: "git", "Executing command without timeout");
            output_future.await.map_err(spawn_error)?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "{}Command failed with exit code: {:?}",
                prefix,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "{}Error: {}", prefix, stderr.trim());
            }

            let diagnostic = if stderr.trim().is_empty() {
                format!("exit code {:?}", output.status.code())
            } else {
                stderr.trim_end().to_string()
            };

            let error = if diagnostic.contains("not a git repository") {
                GitVarsError::GitRepoInvalid {
                    path: self
                        .current_dir
                        .as_ref()
                        .map_or_else(|| ".".to_string(), |d| d.display().to_string()),
                    stderr: diagnostic,
                }
            } else {
                GitVarsError::GitCommandError {
                    command: self.command_line(),
                    stderr: diagnostic,
                }
            };

            return Err(error.into());
        }

        if !stdout.is_empty() {
            tracing::debug!(target: "git", "{}{}", prefix, stdout.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 {
            tracing::debug!(
                target: "git::perf",
                "{}Git {} took {}ms",
                prefix,
                self.args.first().map_or("unknown", String::as_str),
                elapsed.as_millis()
            );
        }

        Ok(GitCommandOutput {
            stdout,
        })
    }

    /// Execute the command and return stdout trimmed of trailing whitespace
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim_end().to_string())
    }
}

/// Output from a Git command
#[derive(Debug, Clone)]
pub struct GitCommandOutput {
    /// Standard output from the Git command
    pub stdout: String,
}

/// Whole milliseconds in `duration`, never reporting a non-zero bound as `0ms`.
fn millis_rounded_up(duration: Duration) -> u128 {
    duration.as_micros().div_ceil(1000)
}
