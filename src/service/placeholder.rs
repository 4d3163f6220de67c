//! `${source:address}` placeholder population.
//!
//! Population walks the document, hands every placeholder's inner expression to
//! the resolver chain, and writes the results back. A string that is exactly one
//! placeholder takes the resolved value as-is (it may be a number or a whole
//! sub-document); placeholders embedded in longer text are interpolated.
//!
//! Resolved values may themselves contain placeholders (a `self:` reference to a
//! field that holds `${git:sha1}`), and placeholders may nest
//! (`${self:custom.${opt:stage}}`); both settle over successive passes. A document
//! that still changes after [`MAX_POPULATE_PASSES`] passes is reported as an
//! unresolved reference.

use anyhow::Result;
use regex::Regex;
use serde_json::Value;

use crate::constants::{MAX_POPULATE_PASSES, PREFIX_SEPARATOR};
use crate::core::GitVarsError;
use crate::resolver::VariableResolver;

/// Finds innermost `${...}` placeholders in strings.
#[derive(Debug, Clone)]
pub struct PlaceholderScanner {
    pattern: Regex,
}

impl PlaceholderScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"\$\{([^${}]*)\}")?,
        })
    }

    /// Whether `text` contains at least one placeholder.
    pub fn contains(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Inner expressions of every innermost placeholder in `text`, trimmed.
    pub fn expressions<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .collect()
    }

    /// Resolve every placeholder in `text`.
    ///
    /// Returns `None` when `text` holds no placeholder.
    pub async fn resolve_text(
        &self,
        text: &str,
        resolver: &dyn VariableResolver,
    ) -> Result<Option<Value>> {
        let matches: Vec<_> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?)))
            .collect();

        let Some((first, _)) = matches.first() else {
            return Ok(None);
        };

        if matches.len() == 1 && first.start() == 0 && first.end() == text.len() {
            let expression = validate(matches[0].1.as_str())?;
            return Ok(Some(resolver.resolve(expression).await?));
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (whole, inner) in &matches {
            let expression = validate(inner.as_str())?;
            let value = resolver.resolve(expression).await?;
            out.push_str(&text[last..whole.start()]);
            out.push_str(&interpolate(&value));
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(Some(Value::String(out)))
    }
}

/// Expression inside `${}` must look like `<source>:<address>`.
fn validate(raw: &str) -> Result<&str> {
    let expression = raw.trim();
    match expression.split_once(PREFIX_SEPARATOR) {
        Some((source, _)) if !source.trim().is_empty() => Ok(expression),
        _ => Err(GitVarsError::InvalidPlaceholder {
            expression: raw.to_string(),
            reason: "expected <source>:<address>".to_string(),
        }
        .into()),
    }
}

/// Text form of a value embedded in a longer string.
fn interpolate(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// JSON Pointer (RFC 6901) token for an object key.
fn pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Pointers and contents of every string in `value` that holds a placeholder.
fn collect_placeholders(
    scanner: &PlaceholderScanner,
    value: &Value,
    pointer: &mut String,
    out: &mut Vec<(String, String)>,
) {
    match value {
        Value::String(text) if scanner.contains(text) => out.push((pointer.clone(), text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                collect_placeholders(scanner, item, pointer, out);
                pointer.truncate(len);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&pointer_token(key));
                collect_placeholders(scanner, item, pointer, out);
                pointer.truncate(len);
            }
        }
        _ => {}
    }
}

/// Replace every placeholder in `document` once.
///
/// Returns the number of strings rewritten.
pub async fn populate_pass(
    scanner: &PlaceholderScanner,
    document: &mut Value,
    resolver: &dyn VariableResolver,
) -> Result<usize> {
    let mut pending = Vec::new();
    collect_placeholders(scanner, document, &mut String::new(), &mut pending);

    let mut rewritten = 0;
    for (pointer, text) in pending {
        let Some(value) = scanner.resolve_text(&text, resolver).await? else {
            continue;
        };
        if value == Value::String(text) {
            continue;
        }
        if let Some(slot) = document.pointer_mut(&pointer) {
            *slot = value;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

/// Populate `document` until no placeholder is left.
///
/// `before_pass` sees the document at the start of each pass, so a resolver
/// answering `self:` references can refresh its view. Returns the number of
/// passes that rewrote something.
///
/// # Errors
///
/// Any resolver error aborts population unchanged. If placeholders remain after
/// [`MAX_POPULATE_PASSES`] passes, or a pass makes no progress while
/// placeholders remain, [`GitVarsError::UnresolvedReference`] names the first one.
pub async fn populate_document<F>(
    document: &mut Value,
    resolver: &dyn VariableResolver,
    mut before_pass: F,
) -> Result<usize>
where
    F: FnMut(&Value),
{
    let scanner = PlaceholderScanner::new()?;

    for pass in 0..MAX_POPULATE_PASSES {
        before_pass(&*document);
        let rewritten = populate_pass(&scanner, document, resolver).await?;
        tracing::debug!("Population pass {} rewrote {} value(s)", pass + 1, rewritten);
        if rewritten == 0 {
            return match first_remaining(&scanner, document) {
                None => Ok(pass),
                Some(expression) => Err(GitVarsError::UnresolvedReference {
                    expression,
                    reason: "the value refers back to itself".to_string(),
                }
                .into()),
            };
        }
    }

    match first_remaining(&scanner, document) {
        None => Ok(MAX_POPULATE_PASSES),
        Some(expression) => Err(GitVarsError::UnresolvedReference {
            expression,
            reason: format!("still unresolved after {MAX_POPULATE_PASSES} passes"),
        }
        .into()),
    }
}

fn first_remaining(scanner: &PlaceholderScanner, document: &Value) -> Option<String> {
    let mut pending = Vec::new();
    collect_placeholders(scanner, document, &mut String::new(), &mut pending);
    pending
        .first()
        .and_then(|(_, text)| scanner.expressions(text).first().map(|e| (*e).to_string()))
}
