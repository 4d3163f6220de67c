//! `gitvars queries` - list the query catalog and the export table.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fmt::Write;

use crate::git::GitQuery;
use crate::plugin::EXPORT_TABLE;

#[derive(Args, Debug)]
pub struct QueriesCommand {}

impl QueriesCommand {
    pub fn execute(self) -> Result<()> {
        print!("{}", format_catalog());
        Ok(())
    }
}

fn format_catalog() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Queries".bold());
    for query in GitQuery::ALL {
        let exported =
            EXPORT_TABLE.iter().find(|entry| entry.query == query).map(|entry| entry.name);
        let _ = writeln!(
            out,
            "  {:<16} git {:<30} {}",
            format!("git:{query}"),
            query.git_args().join(" "),
            exported.map(|name| format!("-> {name}")).unwrap_or_default()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_every_query_and_export() {
        colored::control::set_override(false);
        let catalog = format_catalog();

        for query in GitQuery::ALL {
            assert!(catalog.contains(&format!("git:{query}")));
        }
        for entry in EXPORT_TABLE {
            assert!(catalog.contains(&format!("-> {}", entry.name)));
        }
        assert!(catalog.contains("git rev-parse --short HEAD"));
    }
}
