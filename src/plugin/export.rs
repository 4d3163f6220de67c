//! Export engine: injects git metadata into every function's `environment` and
//! `tags` maps.

use anyhow::Result;
use indexmap::IndexMap;

use crate::cache::ResolutionCache;
use crate::git::GitQuery;
use crate::service::{FunctionDefinition, GitVariablesSettings};

/// One exported variable: the query that produces it and the key it is written under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportEntry {
    pub query: GitQuery,
    pub name: &'static str,
}

/// Variables written into functions, in write order.
pub const EXPORT_TABLE: [ExportEntry; 6] = [
    ExportEntry {
        query: GitQuery::Sha1,
        name: "GIT_COMMIT_SHORT",
    },
    ExportEntry {
        query: GitQuery::Commit,
        name: "GIT_COMMIT_LONG",
    },
    ExportEntry {
        query: GitQuery::Branch,
        name: "GIT_BRANCH",
    },
    ExportEntry {
        query: GitQuery::IsDirty,
        name: "GIT_IS_DIRTY",
    },
    ExportEntry {
        query: GitQuery::Repository,
        name: "GIT_REPOSITORY",
    },
    ExportEntry {
        query: GitQuery::Tags,
        name: "GIT_TAGS",
    },
];

/// What an export pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    /// Functions visited
    pub functions: usize,
    /// Keys written
    pub written: usize,
    /// Keys left alone because the function already defined them
    pub kept: usize,
}

/// Write `value` under `name` into the selected maps of `function`.
///
/// A map is created empty on first write. An existing key is never replaced,
/// whatever its value. Returns `(written, kept)`.
pub fn export_variable(
    function: &mut FunctionDefinition,
    name: &str,
    value: &str,
    set_on_env: bool,
    set_on_tags: bool,
) -> (usize, usize) {
    let mut written = 0;
    let mut kept = 0;
    let targets = [(set_on_env, &mut function.environment), (set_on_tags, &mut function.tags)];

    for (enabled, map) in targets {
        if !enabled {
            continue;
        }
        let map = map.get_or_insert_with(IndexMap::new);
        if map.contains_key(name) {
            kept += 1;
        } else {
            map.insert(name.to_string(), value.to_string());
            written += 1;
        }
    }
    (written, kept)
}

/// Export every [`EXPORT_TABLE`] entry into every function.
///
/// - Disabled settings: nothing is resolved and nothing is touched.
/// - No functions: nothing is resolved.
/// - Entries allowed on neither map are skipped entirely (not even resolved).
/// - All remaining entries are resolved through `cache` before any function is
///   modified, so a failing query leaves every function as it was.
///
/// Repeated calls are idempotent: values come from the cache and keys written
/// by an earlier pass are kept.
pub async fn export_all(
    cache: &ResolutionCache,
    settings: &GitVariablesSettings,
    functions: &mut IndexMap<String, FunctionDefinition>,
) -> Result<ExportSummary> {
    if !settings.export_enabled {
        tracing::debug!("Git variable export disabled");
        return Ok(ExportSummary::default());
    }
    if functions.is_empty() {
        return Ok(ExportSummary::default());
    }

    let entries: Vec<_> = EXPORT_TABLE
        .iter()
        .map(|entry| (entry, settings.allows_env(entry.name), settings.allows_tags(entry.name)))
        .filter(|(_, env, tags)| *env || *tags)
        .collect();

    let values = futures::future::try_join_all(
        entries.iter().map(|(entry, _, _)| cache.get_or_compute(entry.query)),
    )
    .await?;

    let mut summary = ExportSummary {
        functions: functions.len(),
        ..ExportSummary::default()
    };
    for function in functions.values_mut() {
        for ((entry, env, tags), value) in entries.iter().zip(&values) {
            let (written, kept) = export_variable(function, entry.name, value, *env, *tags);
            summary.written += written;
            summary.kept += kept;
        }
    }

    tracing::debug!(
        "Exported git variables into {} function(s): {} written, {} kept",
        summary.functions,
        summary.written,
        summary.kept
    );
    Ok(summary)
}
