//! Effect Registry - Factory Pattern for Effects
//!
//! Effects register a factory under their symbol; hosts (batch commands,
//! the CLI) create effects by name without knowing concrete types.

use crate::traits::Effect;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Factory function type for creating effects
pub type CreateFn = Arc<dyn Fn() -> Box<dyn Effect> + Send + Sync>;

/// Factory for a specific effect type
#[derive(Clone)]
pub struct EffectFactory {
    /// Effect symbol (lookup name)
    pub symbol: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Create a new instance with default parameters
    pub create: CreateFn,
}

impl EffectFactory {
    /// Create a factory from a constructor function
    pub fn new<F>(symbol: &'static str, description: &'static str, create: F) -> Self
    where
        F: Fn() -> Box<dyn Effect> + Send + Sync + 'static,
    {
        Self {
            symbol,
            description,
            create: Arc::new(create),
        }
    }
}

impl Debug for EffectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectFactory")
            .field("symbol", &self.symbol)
            .field("description", &self.description)
            .finish()
    }
}

/// Registry of available effects
///
/// Lookup is case-insensitive. Registering a symbol twice replaces the
/// earlier factory.
#[derive(Debug, Default, Clone)]
pub struct EffectRegistry {
    factories: BTreeMap<String, EffectFactory>,
}

impl EffectRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register an effect factory
    pub fn register(&mut self, factory: EffectFactory) {
        tracing::debug!("Registering effect '{}'", factory.symbol);
        self.factories
            .insert(factory.symbol.to_ascii_lowercase(), factory);
    }

    /// Get a factory by symbol
    pub fn get_factory(&self, symbol: &str) -> Option<&EffectFactory> {
        self.factories.get(&symbol.trim().to_ascii_lowercase())
    }

    /// Check if an effect is registered
    pub fn contains(&self, symbol: &str) -> bool {
        self.get_factory(symbol).is_some()
    }

    /// Create an effect instance with default parameters
    pub fn create(&self, symbol: &str) -> Option<Box<dyn Effect>> {
        self.get_factory(symbol).map(|factory| (factory.create)())
    }

    /// Registered factories, ordered by symbol
    pub fn factories(&self) -> impl Iterator<Item = &EffectFactory> {
        self.factories.values()
    }

    /// Registered symbols, ordered
    pub fn symbols(&self) -> Vec<&'static str> {
        self.factories.values().map(|f| f.symbol).collect()
    }

    /// Number of registered effects
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no effects are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
