//! # Command Layer
//!
//! Business logic behind each `vpfconf` operation. Commands take plain Rust
//! arguments and return a [`CmdResult`]; they never print.
//!
//! - [`tree`]: load and report the feature catalog
//! - [`properties`]: select features by name and build a layer bag in one step
//! - [`session`]: the pick/add/finalize workflow, one command at a time
//! - [`config`]: show and change stored defaults

use crate::catalog::FeatureCatalog;
use crate::config::VpfConfConfig;
use crate::model::SelectedFeature;
use crate::properties::PropertyBag;

pub mod config;
pub mod properties;
pub mod session;
pub mod tree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A finished layer: its name (when handed to a layer handler) and properties.
#[derive(Debug, Clone)]
pub struct LayerOutput {
    pub name: Option<String>,
    pub properties: PropertyBag,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub catalog: Option<FeatureCatalog>,
    pub layer: Option<LayerOutput>,
    pub selection: Vec<SelectedFeature>,
    pub config: Option<VpfConfConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_catalog(mut self, catalog: FeatureCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_layer(mut self, name: Option<String>, properties: PropertyBag) -> Self {
        self.layer = Some(LayerOutput { name, properties });
        self
    }

    pub fn with_selection(mut self, selection: Vec<SelectedFeature>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_config(mut self, config: VpfConfConfig) -> Self {
        self.config = Some(config);
        self
    }
}
