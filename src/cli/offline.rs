//! `gitvars offline` - each function's environment after the offline hooks.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use indexmap::IndexMap;
use std::fmt::Write;

use super::CliContext;
use crate::host::HostCommand;
use crate::service::ServiceConfig;

#[derive(Args, Debug)]
pub struct OfflineCommand {
    /// Print a JSON object of function name to environment
    #[arg(long)]
    json: bool,
}

impl OfflineCommand {
    pub async fn execute(self, ctx: &CliContext) -> Result<()> {
        let (mut host, _plugin) = ctx.build_host(false)?;
        host.run_command(HostCommand::Offline).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&environments(host.service()))?);
        } else {
            print!("{}", format_environments(host.service()));
        }
        Ok(())
    }
}

fn environments(service: &ServiceConfig) -> IndexMap<&str, IndexMap<String, String>> {
    service
        .functions
        .iter()
        .map(|(name, function)| (name.as_str(), function.environment.clone().unwrap_or_default()))
        .collect()
}

/// `name:` followed by indented `KEY=VALUE` lines, one block per function.
fn format_environments(service: &ServiceConfig) -> String {
    let mut out = String::new();
    for (name, env) in environments(service) {
        let _ = writeln!(out, "{}:", name.bold());
        if env.is_empty() {
            let _ = writeln!(out, "  {}", "(no environment)".dimmed());
        }
        for (key, value) in env {
            let _ = writeln!(out, "  {key}={value}");
        }
    }
    out
}
