//! Pipe provider
//!
//! The scope that owns one channel registry. Inlets and outlets created
//! from the same provider can reach each other; nodes of different
//! providers never do.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::content::Content;
use crate::error::Result;
use crate::node::{Inlet, Outlet};
use crate::registry::{ChannelRegistry, RegistryConfig, RegistryEvent};
use crate::stats::RegistryStats;

/// Scope owning a channel registry
pub struct Provider<C: Content> {
    registry: Arc<ChannelRegistry<C>>,
}

impl<C: Content> Provider<C> {
    /// Create a new provider with default registry configuration
    pub fn new() -> Self {
        Self::from_registry(ChannelRegistry::new())
    }

    /// Create a new provider with custom registry configuration
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        Ok(Self::from_registry(ChannelRegistry::with_config(config)?))
    }

    fn from_registry(registry: ChannelRegistry<C>) -> Self {
        tracing::debug!(scope = %registry.config().scope, "Pipe scope opened");

        Self {
            registry: Arc::new(registry),
        }
    }

    /// Get a reference to the channel registry
    pub fn registry(&self) -> &Arc<ChannelRegistry<C>> {
        &self.registry
    }

    /// Scope label from the registry configuration
    pub fn scope(&self) -> &str {
        &self.registry.config().scope
    }

    /// Create an inlet publishing `content` under `name`
    pub fn inlet(&self, name: Option<&str>, content: Option<C>) -> Inlet<C> {
        Inlet::new(Arc::clone(&self.registry), name, content)
    }

    /// Create an outlet listening to `name` with fallback `default`
    pub fn outlet(&self, name: Option<&str>, default: Option<C>) -> Outlet<C> {
        Outlet::new(Arc::clone(&self.registry), name, default)
    }

    /// Subscribe to the registry event tap
    pub fn events(&self) -> broadcast::Receiver<RegistryEvent> {
        self.registry.events()
    }

    /// Get registry-wide statistics
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }
}

impl<C: Content> Default for Provider<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Content> Drop for Provider<C> {
    fn drop(&mut self) {
        tracing::debug!(
            scope = %self.registry.config().scope,
            channels = self.registry.channel_count(),
            nodes = Arc::strong_count(&self.registry) - 1,
            "Pipe scope closed"
        );
    }
}

impl<C: Content> std::fmt::Debug for Provider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;

    #[test]
    fn test_nodes_share_registry() {
        let provider = Provider::<String>::new();
        let _inlet = provider.inlet(Some("aloha"), Some("hi".to_string()));
        let outlet = provider.outlet(Some("aloha"), None);

        assert_eq!(outlet.displayed(), Some("hi".to_string()));
        assert_eq!(provider.registry().channel_count(), 1);
    }

    #[test]
    fn test_providers_are_isolated() {
        let first = Provider::<String>::new();
        let second = Provider::<String>::new();

        let _inlet = first.inlet(Some("aloha"), Some("hi".to_string()));
        let outlet = second.outlet(Some("aloha"), Some("default".to_string()));

        assert_eq!(outlet.displayed(), Some("default".to_string()));
    }

    #[test]
    fn test_with_config() {
        let provider = Provider::<String>::with_config(RegistryConfig::with_scope("sidebar"));
        let provider = tokio_test::assert_ok!(provider);
        assert_eq!(provider.scope(), "sidebar");

        let invalid = Provider::<String>::with_config(RegistryConfig::default().event_capacity(0));
        assert!(matches!(invalid, Err(PipeError::InvalidConfig(_))));
    }

    #[test]
    fn test_nodes_outlive_provider() {
        let provider = Provider::<String>::new();
        let inlet = provider.inlet(Some("aloha"), Some("hi".to_string()));
        let outlet = provider.outlet(Some("aloha"), None);

        drop(provider);

        assert_eq!(outlet.displayed(), Some("hi".to_string()));
        drop(inlet);
        assert_eq!(outlet.displayed(), None);
    }
}
