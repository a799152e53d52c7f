//! Registry configuration

use crate::error::{PipeError, Result};

/// Default capacity of the registry event tap
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Registry configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Scope label attached to every log record of this registry
    pub scope: String,

    /// Capacity of the event broadcast channel
    ///
    /// Slow event receivers skip the oldest events once this many are
    /// pending. Fan-out to observers is never affected.
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scope: "pipe".to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Create a new config with a custom scope label
    pub fn with_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Default::default()
        }
    }

    /// Set the scope label
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the event tap capacity
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Check the configuration before building a registry from it
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(PipeError::InvalidConfig(
                "event_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.scope, "pipe");
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_scope() {
        let config = RegistryConfig::with_scope("sidebar");

        assert_eq!(config.scope, "sidebar");
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default().scope("dialogs").event_capacity(8);

        assert_eq!(config.scope, "dialogs");
        assert_eq!(config.event_capacity, 8);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = RegistryConfig::default().event_capacity(0);

        assert!(matches!(
            config.validate(),
            Err(PipeError::InvalidConfig(_))
        ));
    }
}
