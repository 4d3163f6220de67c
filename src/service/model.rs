//! Service document model and file loading.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

use crate::core::GitVarsError;

/// On-disk format of a service document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFormat {
    Yaml,
    Json,
    Toml,
}

impl ServiceFormat {
    /// Format for `path`, based on its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yml" | "yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(GitVarsError::ServiceParseError {
                file: path.display().to_string(),
                reason: "unsupported extension (expected .yml, .yaml, .json or .toml)".to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for ServiceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        })
    }
}

/// One deployable unit of the service.
///
/// `environment` and `tags` stay `None` until something writes to them, so a
/// document round-trips without gaining empty maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub environment: Option<IndexMap<String, String>>,

    #[serde(
        default,
        deserialize_with = "deserialize_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<IndexMap<String, String>>,

    /// Keys this crate does not interpret (`events`, `memorySize`, ...)
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// The host's configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub service: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Value>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom: Map<String, Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub functions: IndexMap<String, FunctionDefinition>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ServiceConfig {
    /// Load a document, picking the parser from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let format = ServiceFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read service file: {}", path.display()))?;
        Self::parse(&content, format).map_err(|e| {
            GitVarsError::ServiceParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Parse `content` in the given format.
    pub fn parse(content: &str, format: ServiceFormat) -> Result<Self> {
        let config = match format {
            ServiceFormat::Yaml => serde_yaml::from_str(content).map_err(GitVarsError::from)?,
            ServiceFormat::Json => serde_json::from_str(content).map_err(GitVarsError::from)?,
            ServiceFormat::Toml => toml::from_str(content).map_err(GitVarsError::from)?,
        };
        Ok(config)
    }

    /// Render the document in `format`.
    pub fn render(&self, format: ServiceFormat) -> Result<String> {
        let rendered = match format {
            ServiceFormat::Yaml => serde_yaml::to_string(self).map_err(GitVarsError::from)?,
            ServiceFormat::Json => {
                serde_json::to_string_pretty(self).map_err(GitVarsError::from)? + "\n"
            }
            ServiceFormat::Toml => toml::to_string_pretty(self).map_err(|e| {
                GitVarsError::ConfigError {
                    message: format!("Cannot render document as TOML: {e}"),
                }
            })?,
        };
        Ok(rendered)
    }

    /// The whole document as a JSON tree, for placeholder population.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self).map_err(GitVarsError::from)?)
    }

    /// Rebuild a document from a (populated) JSON tree.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value).map_err(GitVarsError::from)?)
    }

    /// Function names in declaration order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }
}

/// Accept scalar values in `environment`/`tags` maps and store them as strings.
///
/// Documents commonly write `TIMEOUT: 30` or `DEBUG: true`; the value a
/// function sees is always text. Nested maps or lists are rejected.
fn deserialize_string_map<'de, D>(
    deserializer: D,
) -> Result<Option<IndexMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.map(|map| {
        map.into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => {
                        return Err(serde::de::Error::custom(format!(
                            "value of '{key}' must be a string, got {other}"
                        )));
                    }
                };
                Ok((key, text))
            })
            .collect()
    })
    .transpose()
}
