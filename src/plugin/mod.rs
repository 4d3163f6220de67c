//! The git-variables plugin.
//!
//! Registering the plugin with a [`Host`] does two things, both backed by one
//! [`ResolutionCache`]:
//!
//! 1. installs a [`GitVariableResolver`] in front of the host's resolver, so
//!    `${git:<query>}` placeholders resolve during population;
//! 2. hooks every [`LifecycleEvent`] to [`export_all`], which writes the
//!    [`EXPORT_TABLE`] variables into each function's `environment` and `tags`.
//!
//! A value seen through a placeholder and the same value exported into a
//! function come from the same cache entry, so they always agree and git runs at
//! most once per query.
//!
//! # Example
//!
//! ```rust,no_run
//! use git_variables::git::GitCliProvider;
//! use git_variables::host::{Host, HostCommand};
//! use git_variables::plugin::GitVariablesPlugin;
//! use git_variables::service::{HostResolver, ServiceConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = ServiceConfig::load(Path::new("serverless.yml"))?;
//! let mut host = Host::new(service, HostResolver::new());
//! GitVariablesPlugin::register(&mut host, Arc::new(GitCliProvider::new()));
//!
//! host.run_command(HostCommand::Package).await?;
//! # Ok(())
//! # }
//! ```

mod export;

pub use export::{EXPORT_TABLE, ExportEntry, ExportSummary, export_all, export_variable};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::cache::ResolutionCache;
use crate::git::MetadataProvider;
use crate::host::{Host, LifecycleEvent, Plugin};
use crate::resolver::GitVariableResolver;
use crate::service::{GitVariablesSettings, ServiceConfig};

/// Host plugin exporting git metadata into functions.
#[derive(Debug)]
pub struct GitVariablesPlugin {
    cache: Arc<ResolutionCache>,
}

impl GitVariablesPlugin {
    pub fn new(cache: Arc<ResolutionCache>) -> Self {
        Self {
            cache,
        }
    }

    /// Create a cache over `provider`, install the git resolver in front of the
    /// host's current one and register the export hooks.
    pub fn register(host: &mut Host, provider: Arc<dyn MetadataProvider>) -> Arc<Self> {
        let cache = Arc::new(ResolutionCache::new(provider));

        let resolver_cache = Arc::clone(&cache);
        host.resolver_slot_mut()
            .install(move |prior| Arc::new(GitVariableResolver::new(resolver_cache, prior)));

        let plugin = Arc::new(Self::new(cache));
        host.add_plugin(plugin.clone());
        plugin
    }

    /// The cache shared by the resolver and the export engine.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Read settings from `service.custom` and export into its functions.
    pub async fn export_git_variables(&self, service: &mut ServiceConfig) -> Result<ExportSummary> {
        let settings = GitVariablesSettings::from_custom(&service.custom)?;
        export_all(&self.cache, &settings, &mut service.functions).await
    }
}

#[async_trait]
impl Plugin for GitVariablesPlugin {
    fn name(&self) -> &str {
        "git-variables"
    }

    fn hooks(&self) -> &[LifecycleEvent] {
        &LifecycleEvent::ALL
    }

    async fn on_event(&self, event: LifecycleEvent, service: &mut ServiceConfig) -> Result<()> {
        let summary = self.export_git_variables(service).await?;
        tracing::info!(
            "{}: exported git variables into {} function(s)",
            event,
            summary.functions
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GitVarsError;
    use crate::git::GitQuery;
    use crate::host::HostCommand;
    use crate::service::{HostResolver, ServiceFormat};
    use crate::test_utils::{CountingProvider, ServiceFixture};
    use serde_json::json;

    fn host(yaml: &str) -> Host {
        let service = ServiceConfig::parse(yaml, ServiceFormat::Yaml).unwrap();
        Host::new(service, HostResolver::new())
    }

    #[tokio::test]
    async fn test_placeholders_and_export_share_one_query() {
        let provider = Arc::new(CountingProvider::new().with_defaults());
        let mut host = host(ServiceFixture::two_functions());
        GitVariablesPlugin::register(&mut host, provider.clone());

        host.run_command(HostCommand::Package).await.unwrap();

        let service = host.service();
        assert_eq!(service.custom["sha"], "90440bd");
        assert_eq!(service.custom["describe"], "my_tag-1-g90440bd");
        assert_eq!(service.custom["banner"], "build 90440bd on dev");

        let hello = service.function("hello").unwrap();
        assert_eq!(hello.environment.as_ref().unwrap()["GIT_COMMIT_SHORT"], "90440bd");
        assert_eq!(hello.tags.as_ref().unwrap()["GIT_BRANCH"], "another_branch");

        let world = service.function("world").unwrap();
        assert_eq!(world.environment.as_ref().unwrap()["GIT_BRANCH"], "pinned");
        assert_eq!(world.tags.as_ref().unwrap()["GIT_BRANCH"], "pinned");

        assert_eq!(provider.calls(GitQuery::Sha1), 1);
        assert_eq!(provider.calls(GitQuery::Describe), 1);
    }

    #[tokio::test]
    async fn test_offline_runs_export_twice_without_new_queries() {
        let provider = Arc::new(CountingProvider::new().with_defaults());
        let mut host = host("service: svc\nfunctions:\n  f:\n    handler: h.f\n");
        GitVariablesPlugin::register(&mut host, provider.clone());

        host.run_command(HostCommand::Offline).await.unwrap();
        assert_eq!(provider.total_calls(), EXPORT_TABLE.len());
    }

    #[tokio::test]
    async fn test_disabled_switch_from_document() {
        let provider = Arc::new(CountingProvider::new().with_defaults());
        let mut host = host(
            "service: svc\ncustom:\n  exportGitVariables: false\n\
             functions:\n  f:\n    handler: h.f\n",
        );
        GitVariablesPlugin::register(&mut host, provider.clone());

        host.run_command(HostCommand::Print).await.unwrap();
        let f = host.service().function("f").unwrap();
        assert!(f.environment.is_none());
        assert!(f.tags.is_none());
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_switch_may_come_from_a_placeholder() {
        let provider = Arc::new(CountingProvider::new().with_defaults());
        let mut host = host(
            "service: svc\ncustom:\n  off: false\n  exportGitVariables: ${self:custom.off}\n\
             functions:\n  f: {}\n",
        );
        GitVariablesPlugin::register(&mut host, provider.clone());

        host.run_command(HostCommand::Package).await.unwrap();
        assert!(host.service().function("f").unwrap().environment.is_none());
    }

    #[tokio::test]
    async fn test_bad_key_rejects_population() {
        let provider = Arc::new(CountingProvider::new().with_defaults());
        let mut host = host("service: svc\ncustom:\n  myVar: ${git:badKey}\n");
        GitVariablesPlugin::register(&mut host, provider.clone());

        let err = host.populate_service().await.unwrap_err();
        assert!(err.to_string().starts_with("Git variable badKey is unknown."));
        assert_eq!(provider.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_export_failure_aborts_command() {
        let provider =
            Arc::new(CountingProvider::new().with_defaults().failing(GitQuery::Branch, 1));
        let mut host = host("service: svc\nfunctions:\n  f:\n    handler: h.f\n");
        GitVariablesPlugin::register(&mut host, provider.clone());

        let err = host.run_command(HostCommand::Package).await.unwrap_err();
        assert!(err.downcast_ref::<GitVarsError>().is_some_and(GitVarsError::is_provider_failure));
        assert!(host.service().function("f").unwrap().environment.is_none());
    }

    #[tokio::test]
    async fn test_non_git_expressions_reach_host_resolver() {
        let provider = Arc::new(CountingProvider::new().with_defaults());
        let mut host = host("service: svc\ncustom:\n  myVar: myVar\n");
        GitVariablesPlugin::register(&mut host, provider.clone());

        assert_eq!(host.resolve("self:custom.myVar").await.unwrap(), json!("myVar"));
        assert_eq!(host.resolve("git:branch").await.unwrap(), json!("another_branch"));
        assert_eq!(host.resolver_slot_mut().installed(), 1);
    }

    #[tokio::test]
    async fn test_malformed_settings_fail_the_hook() {
        let provider = Arc::new(CountingProvider::new().with_defaults());
        let mut host = host(
            "service: svc\ncustom:\n  gitVariablesEnvWhitelist: GIT_BRANCH\nfunctions:\n  f: {}\n",
        );
        GitVariablesPlugin::register(&mut host, provider.clone());

        let err = host.run_command(HostCommand::Package).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitVarsError>(),
            Some(GitVarsError::ConfigError { .. })
        ));
        assert_eq!(provider.total_calls(), 0);
    }
}
