//! Consumers of finished layer property bags.

use crate::error::{Result, VpfError};
use crate::properties::PropertyBag;
use tracing::info;

/// Receives a new layer built from a finalized selection.
pub trait LayerHandler {
    fn add_layer(&mut self, name: &str, properties: PropertyBag) -> Result<()>;
}

/// Keeps added layers in memory, in the order they arrive.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<(String, PropertyBag)>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[(String, PropertyBag)] {
        &self.layers
    }

    pub fn get(&self, name: &str) -> Option<&PropertyBag> {
        self.layers
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, bag)| bag)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl LayerHandler for LayerRegistry {
    fn add_layer(&mut self, name: &str, properties: PropertyBag) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VpfError::Api("Layer name cannot be empty".to_string()));
        }
        info!(layer = name, properties = properties.len(), "layer added");
        self.layers.push((name.to_string(), properties));
        Ok(())
    }
}
