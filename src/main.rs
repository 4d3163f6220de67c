//! gitvars CLI entry point
//!
//! Parses arguments, installs logging, runs the command and renders errors
//! with context and suggestions.

use anyhow::Result;
use clap::Parser;
use git_variables::cli;
use git_variables::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
