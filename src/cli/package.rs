//! `gitvars package` - populate, export and write the service document.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{CliContext, OutputFormat};
use crate::host::HostCommand;
use crate::service::ServiceFormat;
use crate::utils::atomic_write;

#[derive(Args, Debug)]
pub struct PackageCommand {
    /// Write the packaged document here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output format (default: from the output extension, else json)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

impl PackageCommand {
    pub async fn execute(self, ctx: &CliContext) -> Result<()> {
        let (mut host, plugin) = ctx.build_host(false)?;
        host.run_command(HostCommand::Package).await?;

        let format = self.output_format()?;
        let rendered = host.service().render(format)?;

        match &self.output {
            Some(path) => {
                atomic_write(path, rendered.as_bytes())?;
                let stats = plugin.cache().stats();
                eprintln!(
                    "{} Packaged {} function(s) to {} ({} git queries)",
                    "✓".green(),
                    host.service().functions.len(),
                    path.display(),
                    stats.misses
                );
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }

    fn output_format(&self) -> Result<ServiceFormat> {
        match (self.format, &self.output) {
            (Some(format), _) => Ok(format.into()),
            (None, Some(path)) => ServiceFormat::from_path(path),
            (None, None) => Ok(ServiceFormat::Json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_selection() {
        let cmd = |output: Option<&str>, format| PackageCommand {
            output: output.map(PathBuf::from),
            format,
        };

        assert_eq!(cmd(None, None).output_format().unwrap(), ServiceFormat::Json);
        assert_eq!(cmd(Some("out.yml"), None).output_format().unwrap(), ServiceFormat::Yaml);
        assert_eq!(
            cmd(Some("out.yml"), Some(OutputFormat::Toml)).output_format().unwrap(),
            ServiceFormat::Toml
        );
        assert!(cmd(Some("out.txt"), None).output_format().is_err());
    }
}
