//! Transport registry.
//!
//! Maps transport names to factories. Constructed at startup and consulted
//! once to build the configured transport; no global state.

use ds4_common::transport::{Transport, TransportError, TransportFactory};
use std::collections::HashMap;

use super::simulation;

/// Registry of available transports.
pub struct TransportRegistry {
    factories: HashMap<&'static str, TransportFactory>,
}

impl TransportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every built-in transport.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(simulation::NAME, simulation::create_transport);
        registry
    }

    /// Register a transport factory.
    ///
    /// # Panics
    /// Panics if a transport with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: TransportFactory) {
        if self.factories.contains_key(name) {
            panic!("Transport '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a transport factory by name.
    pub fn get_factory(&self, name: &str) -> Option<TransportFactory> {
        self.factories.get(name).copied()
    }

    /// Create a transport instance by name.
    ///
    /// # Errors
    /// Returns `TransportError::TransportNotFound` if `name` is not registered,
    /// or whatever the factory reports for an invalid `section`.
    pub fn create(
        &self,
        name: &str,
        section: &toml::Table,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| TransportError::TransportNotFound(name.to_string()))?;
        factory(section)
    }

    /// List all registered transport names, sorted.
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::new()
    }
}
