//! Git-variables settings read from the service document's `custom` block.

use anyhow::Result;
use serde_json::{Map, Value};

use crate::constants::{ENV_ALLOWLIST_KEY, EXPORT_SWITCH_KEY, TAGS_ALLOWLIST_KEY};
use crate::core::GitVarsError;

/// Export switch and per-map allow-lists.
///
/// ```yaml
/// custom:
///   exportGitVariables: true          # absent means enabled
///   gitVariablesEnvWhitelist: [GIT_COMMIT_SHORT]
///   gitVariablesTagsWhitelist: [GIT_BRANCH, GIT_TAGS]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitVariablesSettings {
    /// `false` only when the document explicitly disables export
    pub export_enabled: bool,
    /// Exported names allowed in `environment`; `None` allows all
    pub env_allowlist: Option<Vec<String>>,
    /// Exported names allowed in `tags`; `None` allows all
    pub tags_allowlist: Option<Vec<String>>,
}

impl Default for GitVariablesSettings {
    fn default() -> Self {
        Self {
            export_enabled: true,
            env_allowlist: None,
            tags_allowlist: None,
        }
    }
}

impl GitVariablesSettings {
    /// Read settings from a (populated) `custom` block.
    ///
    /// A `null` value counts as absent.
    ///
    /// # Errors
    ///
    /// [`GitVarsError::ConfigError`] if the switch is not a boolean or an
    /// allow-list is not a list of strings.
    pub fn from_custom(custom: &Map<String, Value>) -> Result<Self> {
        let export_enabled = match custom.get(EXPORT_SWITCH_KEY) {
            None | Some(Value::Null) => true,
            Some(Value::Bool(enabled)) => *enabled,
            Some(other) => {
                return Err(GitVarsError::ConfigError {
                    message: format!(
                        "custom.{EXPORT_SWITCH_KEY} must be true or false, got {other}"
                    ),
                }
                .into());
            }
        };

        Ok(Self {
            export_enabled,
            env_allowlist: read_allowlist(custom, ENV_ALLOWLIST_KEY)?,
            tags_allowlist: read_allowlist(custom, TAGS_ALLOWLIST_KEY)?,
        })
    }

    /// Whether `name` may be written into `environment`.
    pub fn allows_env(&self, name: &str) -> bool {
        allows(self.env_allowlist.as_deref(), name)
    }

    /// Whether `name` may be written into `tags`.
    pub fn allows_tags(&self, name: &str) -> bool {
        allows(self.tags_allowlist.as_deref(), name)
    }
}

fn allows(list: Option<&[String]>, name: &str) -> bool {
    list.is_none_or(|names| names.iter().any(|n| n == name))
}

fn read_allowlist(custom: &Map<String, Value>, key: &str) -> Result<Option<Vec<String>>> {
    let items = match custom.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(GitVarsError::ConfigError {
                message: format!("custom.{key} must be a list of variable names, got {other}"),
            }
            .into());
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(name) => Ok(name.clone()),
            other => Err(GitVarsError::ConfigError {
                message: format!("custom.{key} entries must be strings, got {other}"),
            }
            .into()),
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}
