//! `gitvars print` - show the populated service document.

use anyhow::Result;
use clap::Args;

use super::{CliContext, OutputFormat};
use crate::host::HostCommand;

#[derive(Args, Debug)]
pub struct PrintCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,
}

impl PrintCommand {
    pub async fn execute(self, ctx: &CliContext) -> Result<()> {
        let (mut host, _plugin) = ctx.build_host(false)?;
        host.run_command(HostCommand::Print).await?;
        print!("{}", host.service().render(self.format.into())?);
        Ok(())
    }
}
