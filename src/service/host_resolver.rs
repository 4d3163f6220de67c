//! The host's own base resolver: `self:`, `env:` and `opt:` sources.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::constants::PREFIX_SEPARATOR;
use crate::core::GitVarsError;
use crate::resolver::VariableResolver;

/// Resolves host-native sources.
///
/// - `self:<dotted.path>` - a value from the service document (`self:` alone is
///   the whole document); array elements are addressed by index
/// - `env:<NAME>` - a process environment variable
/// - `opt:<name>` - a command-line option passed to the host
///
/// Every other source fails with [`GitVarsError::UnknownSource`]; namespaces such
/// as `git:` are handled by resolvers installed in front of this one.
#[derive(Debug, Default)]
pub struct HostResolver {
    document: RwLock<Value>,
    options: HashMap<String, String>,
}

impl HostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an `opt:` value.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Replace the document view used for `self:` lookups.
    pub fn set_document(&self, document: &Value) {
        let mut guard = self.document.write().unwrap_or_else(PoisonError::into_inner);
        guard.clone_from(document);
    }

    fn lookup_self(&self, expression: &str, path: &str) -> Result<Value> {
        let guard = self.document.read().unwrap_or_else(PoisonError::into_inner);
        let mut current = &*guard;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| GitVarsError::UnresolvedReference {
                expression: expression.to_string(),
                reason: format!("no value at '{path}' in the service document"),
            })?;
        }
        Ok(current.clone())
    }
}

#[async_trait]
impl VariableResolver for HostResolver {
    async fn resolve(&self, expression: &str) -> Result<Value> {
        let (source, address) = expression.split_once(PREFIX_SEPARATOR).ok_or_else(|| {
            GitVarsError::InvalidPlaceholder {
                expression: expression.to_string(),
                reason: "expected <source>:<address>".to_string(),
            }
        })?;
        let address = address.trim();

        match source.trim() {
            "self" => self.lookup_self(expression, address),
            "env" => std::env::var(address).map(Value::String).map_err(|_| {
                GitVarsError::UnresolvedReference {
                    expression: expression.to_string(),
                    reason: format!("environment variable {address} is not set"),
                }
                .into()
            }),
            "opt" => self.options.get(address).cloned().map(Value::String).ok_or_else(|| {
                GitVarsError::UnresolvedReference {
                    expression: expression.to_string(),
                    reason: format!("option --{address} was not given"),
                }
                .into()
            }),
            other => Err(GitVarsError::UnknownSource {
                source_name: other.to_string(),
                expression: expression.to_string(),
            }
            .into()),
        }
    }
}
