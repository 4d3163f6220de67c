//! Minimal configuration-processing host.
//!
//! The [`Host`] owns a [`ServiceConfig`], the single resolution entry point
//! ([`ResolverSlot`], based on a [`HostResolver`]) and a list of [`Plugin`]s.
//! A host command populates the document and then raises its lifecycle events:
//!
//! | Command   | Events after population                                  |
//! |-----------|----------------------------------------------------------|
//! | `print`   | `before:print:print`                                     |
//! | `package` | `after:package:initialize`                               |
//! | `offline` | `before:offline:start:init`, `before:offline:start`      |
//!
//! Plugins are awaited one after another in registration order; the first
//! error aborts the command.

mod lifecycle;

pub use lifecycle::{HostCommand, LifecycleEvent};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::resolver::{ResolverSlot, SharedResolver};
use crate::service::{HostResolver, PlaceholderScanner, ServiceConfig, populate_document};

/// Something that reacts to lifecycle events by reading or mutating the document.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Events this plugin wants to receive.
    fn hooks(&self) -> &[LifecycleEvent];

    /// Handle `event`. Only called for events listed by [`Plugin::hooks`].
    async fn on_event(&self, event: LifecycleEvent, service: &mut ServiceConfig) -> Result<()>;
}

pub struct Host {
    service: ServiceConfig,
    base: Arc<HostResolver>,
    slot: ResolverSlot,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Host {
    /// Host for `service`, with `base` as the innermost resolver.
    pub fn new(service: ServiceConfig, base: HostResolver) -> Self {
        let base = Arc::new(base);
        let slot = ResolverSlot::new(base.clone());
        Self {
            service,
            base,
            slot,
            plugins: Vec::new(),
        }
    }

    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut ServiceConfig {
        &mut self.service
    }

    pub fn into_service(self) -> ServiceConfig {
        self.service
    }

    /// The resolution entry point, for components that interpose on it.
    pub fn resolver_slot_mut(&mut self) -> &mut ResolverSlot {
        &mut self.slot
    }

    /// The active resolver.
    pub fn resolver(&self) -> SharedResolver {
        self.slot.current()
    }

    /// Register a plugin; its hooks run after those registered earlier.
    pub fn add_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        tracing::debug!("Registered plugin {} for {:?}", plugin.name(), plugin.hooks());
        self.plugins.push(plugin);
    }

    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Resolve one expression against the current document.
    pub async fn resolve(&self, expression: &str) -> Result<Value> {
        self.base.set_document(&self.service.to_value()?);
        self.slot.resolve(expression).await
    }

    /// Resolve free text against the current document.
    ///
    /// `text` is either a bare expression (`git:sha1`) or a string containing
    /// placeholders (`build-${git:sha1}`). Placeholders inside the result, such
    /// as a `self:` reference to a field holding `${git:branch}`, are resolved too.
    pub async fn resolve_text(&self, text: &str) -> Result<Value> {
        self.base.set_document(&self.service.to_value()?);
        let resolver = self.slot.current();
        let scanner = PlaceholderScanner::new()?;

        let mut value = match scanner.resolve_text(text, resolver.as_ref()).await? {
            Some(value) => value,
            None => resolver.resolve(text.trim()).await?,
        };
        populate_document(&mut value, resolver.as_ref(), |_| {}).await?;
        Ok(value)
    }

    /// Replace every `${...}` placeholder in the document.
    ///
    /// On error the document is left as it was.
    pub async fn populate_service(&mut self) -> Result<()> {
        let mut document = self.service.to_value()?;
        let resolver = self.slot.current();
        let base = Arc::clone(&self.base);

        let passes =
            populate_document(&mut document, resolver.as_ref(), |d| base.set_document(d)).await?;
        tracing::debug!("Service '{}' populated in {} pass(es)", self.service.service, passes);

        self.service = ServiceConfig::from_value(document)?;
        Ok(())
    }

    /// Invoke every plugin hooked to `event`, awaiting each in turn.
    pub async fn run_hook(&mut self, event: LifecycleEvent) -> Result<()> {
        let plugins: Vec<_> =
            self.plugins.iter().filter(|p| p.hooks().contains(&event)).cloned().collect();

        for plugin in plugins {
            tracing::debug!("Running {} hook of {}", event, plugin.name());
            plugin.on_event(event, &mut self.service).await?;
        }
        Ok(())
    }

    /// Populate the document and raise `command`'s events.
    pub async fn run_command(&mut self, command: HostCommand) -> Result<()> {
        self.populate_service().await?;
        for event in command.events() {
            self.run_hook(*event).await?;
        }
        Ok(())
    }
}
