//! Command-line interface for gitvars.
//!
//! The binary drives a small host around a service document so git variables
//! can be inspected and exported without the full deployment framework:
//!
//! ```bash
//! gitvars resolve git:sha1 git:branch          # one value per line
//! gitvars resolve 'release-${git:describe}'    # placeholders in free text
//! gitvars print --format json                  # populated document
//! gitvars package --output .build/service.json # document after export
//! gitvars offline                              # per-function environment
//! gitvars queries                              # catalog and export table
//! ```
//!
//! # Global Options
//!
//! - `--config/-c` - service document (default `serverless.yml`); a missing
//!   file is treated as an empty service by `resolve` only
//! - `--repo-dir/-C` - repository to query; defaults to the nearest directory
//!   containing `.git` above the service document
//! - `--timeout-ms` - bound on each git invocation (env `GITVARS_TIMEOUT_MS`)
//! - `--opt NAME=VALUE` - values for `${opt:NAME}` placeholders
//! - `--verbose/-v`, `--quiet/-q` - log level

mod offline;
mod package;
mod print;
mod queries;
mod resolve;

pub use offline::OfflineCommand;
pub use package::PackageCommand;
pub use print::PrintCommand;
pub use queries::QueriesCommand;
pub use resolve::ResolveCommand;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_QUERY_TIMEOUT, DEFAULT_SERVICE_FILE, TIMEOUT_ENV_VAR};
use crate::core::GitVarsError;
use crate::git::GitCliProvider;
use crate::host::Host;
use crate::plugin::GitVariablesPlugin;
use crate::service::{HostResolver, ServiceConfig, ServiceFormat};
use crate::utils::find_repo_root;

/// Git metadata variables for service configuration documents.
#[derive(Parser, Debug)]
#[command(
    name = "gitvars",
    about = "Resolve ${git:...} variables and export git metadata into service functions",
    version,
    author,
    long_about = "gitvars resolves ${git:<query>} placeholders in a service document and injects \
                  GIT_* variables into every function's environment and tags."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the service document (.yml, .yaml, .json or .toml)
    #[arg(short, long, global = true, default_value = DEFAULT_SERVICE_FILE)]
    config: PathBuf,

    /// Repository to query (default: nearest .git above the service document)
    #[arg(short = 'C', long, global = true)]
    repo_dir: Option<PathBuf>,

    /// Bound on each git invocation, in milliseconds
    #[arg(long, global = true, env = TIMEOUT_ENV_VAR, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Value for an ${opt:NAME} placeholder (repeatable)
    #[arg(long = "opt", global = true, value_name = "NAME=VALUE", value_parser = parse_option)]
    options: Vec<(String, String)>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve expressions such as git:sha1 or 'build-${git:branch}'
    Resolve(ResolveCommand),
    /// Print the populated service document
    Print(PrintCommand),
    /// Populate the document, export git variables and write the result
    Package(PackageCommand),
    /// Show each function's environment as an offline run would see it
    Offline(OfflineCommand),
    /// List the git query catalog and the export table
    Queries(QueriesCommand),
}

/// Document output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
    Toml,
}

impl From<OutputFormat> for ServiceFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Self::Yaml,
            OutputFormat::Json => Self::Json,
            OutputFormat::Toml => Self::Toml,
        }
    }
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: PathBuf,
    pub repo_dir: Option<PathBuf>,
    pub timeout: Duration,
    pub options: Vec<(String, String)>,
}

impl CliContext {
    /// Git provider for this invocation.
    pub fn provider(&self) -> GitCliProvider {
        let provider = GitCliProvider::new().with_timeout(self.timeout);
        match self.repo_dir() {
            Some(dir) => provider.with_repo_dir(dir),
            None => provider,
        }
    }

    /// Explicit `--repo-dir`, else the repository above the service document.
    pub fn repo_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.repo_dir {
            return Some(dir.clone());
        }
        let start = self.config.parent().unwrap_or_else(|| Path::new(""));
        find_repo_root(start)
    }

    /// Load the service document and build a host with the git plugin registered.
    ///
    /// With `allow_missing`, a service file that does not exist yields an empty
    /// document instead of an error.
    pub fn build_host(&self, allow_missing: bool) -> Result<(Host, Arc<GitVariablesPlugin>)> {
        let service = if allow_missing && !self.config.exists() {
            tracing::debug!("{} not found, using an empty service", self.config.display());
            ServiceConfig::default()
        } else {
            if !self.config.exists() {
                return Err(GitVarsError::ConfigError {
                    message: format!("Service file not found: {}", self.config.display()),
                }
                .into());
            }
            ServiceConfig::load(&self.config)?
        };

        let base = self
            .options
            .iter()
            .fold(HostResolver::new(), |resolver, (name, value)| resolver.with_option(name, value));
        let mut host = Host::new(service, base);
        let plugin = GitVariablesPlugin::register(&mut host, Arc::new(self.provider()));
        Ok((host, plugin))
    }
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let ctx = self.context();
        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&ctx).await,
            Commands::Print(cmd) => cmd.execute(&ctx).await,
            Commands::Package(cmd) => cmd.execute(&ctx).await,
            Commands::Offline(cmd) => cmd.execute(&ctx).await,
            Commands::Queries(cmd) => cmd.execute(),
        }
    }

    /// Shared settings derived from the global flags.
    pub fn context(&self) -> CliContext {
        CliContext {
            config: self.config.clone(),
            repo_dir: self.repo_dir.clone(),
            timeout: self.timeout_ms.map_or(DEFAULT_QUERY_TIMEOUT, Duration::from_millis),
            options: self.options.clone(),
        }
    }

    /// Install the global tracing subscriber.
    ///
    /// `--verbose` logs at debug, `--quiet` only errors; otherwise `RUST_LOG`
    /// decides, falling back to warnings. Logs go to stderr so command output
    /// on stdout stays machine-readable.
    pub fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

fn parse_option(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.trim().is_empty() {
        anyhow::bail!("option name must not be empty in '{raw}'");
    }
    Ok((name.trim().to_string(), value.to_string()))
}
