//! `gitvars resolve` - evaluate expressions against the service document.

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value};

use super::CliContext;
use crate::constants::{GIT_PREFIX, PREFIX_SEPARATOR};

#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Expressions: `sha1`, `git:sha1`, `${self:custom.stage}` or text with placeholders
    #[arg(required = true, value_name = "EXPR")]
    expressions: Vec<String>,

    /// Print a JSON object mapping each expression to its value
    #[arg(long)]
    json: bool,
}

impl ResolveCommand {
    pub async fn execute(self, ctx: &CliContext) -> Result<()> {
        let (host, _plugin) = ctx.build_host(true)?;

        let mut resolved = Vec::with_capacity(self.expressions.len());
        for raw in &self.expressions {
            let value = host.resolve_text(&normalize(raw)).await?;
            resolved.push((raw.clone(), value));
        }

        if self.json {
            let object: Map<String, Value> = resolved.into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&object)?);
        } else {
            for (_, value) in &resolved {
                println!("{}", display_value(value));
            }
        }
        Ok(())
    }
}

/// A bare query name (`sha1`) is shorthand for `git:sha1`.
fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains(PREFIX_SEPARATOR) || trimmed.contains("${") {
        trimmed.to_string()
    } else {
        format!("{GIT_PREFIX}{PREFIX_SEPARATOR}{trimmed}")
    }
}

/// Strings print raw; anything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("sha1"), "git:sha1");
        assert_eq!(normalize(" branch "), "git:branch");
        assert_eq!(normalize("git:sha1"), "git:sha1");
        assert_eq!(normalize("self:custom.stage"), "self:custom.stage");
        assert_eq!(normalize("${git:describe}"), "${git:describe}");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("90440bd")), "90440bd");
        assert_eq!(display_value(&json!({ "memory": 512 })), r#"{"memory":512}"#);
        assert_eq!(display_value(&json!(true)), "true");
    }
}
