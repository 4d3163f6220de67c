//! Global constants used throughout the git-variables codebase.
//!
//! Placeholder syntax, host configuration keys, and timeout defaults live here
//! so the resolver, the export engine, and the CLI agree on them.

use std::time::Duration;

/// Namespace token recognized by the git resolver (`${git:sha1}`).
pub const GIT_PREFIX: &str = "git";

/// Separator between a placeholder's source and its address.
pub const PREFIX_SEPARATOR: char = ':';

/// Separator used when several tags point at the current revision.
pub const TAG_SEPARATOR: &str = "::";

/// Default bound on a single external metadata query (1 second).
///
/// Exceeding it fails the query with a timeout error; the query is not
/// retried automatically.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Environment variable that overrides [`DEFAULT_QUERY_TIMEOUT`] for the CLI.
pub const TIMEOUT_ENV_VAR: &str = "GITVARS_TIMEOUT_MS";

/// Host switch under `custom`; `false` disables the export engine.
pub const EXPORT_SWITCH_KEY: &str = "exportGitVariables";

/// Host allow-list under `custom` for the `environment` map.
pub const ENV_ALLOWLIST_KEY: &str = "gitVariablesEnvWhitelist";

/// Host allow-list under `custom` for the `tags` map.
pub const TAGS_ALLOWLIST_KEY: &str = "gitVariablesTagsWhitelist";

/// Maximum number of population passes before a document is considered cyclic.
pub const MAX_POPULATE_PASSES: usize = 10;

/// Default service document looked up by the CLI.
pub const DEFAULT_SERVICE_FILE: &str = "serverless.yml";
