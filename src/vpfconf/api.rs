//! # API Facade
//!
//! The single entry point for every `vpfconf` operation, whatever the UI. It
//! merges stored defaults from [`VpfConfConfig`] with per-call overrides and
//! dispatches to `commands/`. It never prints.
//!
//! `VpfConfigApi<S: MetadataSource>` is generic over where catalogs come from:
//! - Production: `VpfConfigApi<VpfSource>`
//! - Testing: `VpfConfigApi<InMemorySource>`

use crate::catalog::{FeatureCatalog, LoadOptions};
use crate::config::VpfConfConfig;
use crate::error::Result;
use crate::layer::{LayerHandler, LayerRegistry};
use crate::source::MetadataSource;
use std::path::{Path, PathBuf};

pub use crate::commands::config::ConfigAction;
pub use crate::commands::properties::PropertiesRequest;
pub use crate::commands::session::{Session, SessionCommand};
pub use crate::commands::{CmdMessage, CmdResult, LayerOutput, MessageLevel};

/// Per-call overrides of the stored configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub show_all: Option<bool>,
    pub search_by_feature: Option<bool>,
    /// Style `(key, value)` pairs applied over the stored style, in order.
    pub style: Vec<(String, String)>,
}

pub struct VpfConfigApi<S: MetadataSource> {
    source: S,
    config_dir: PathBuf,
}

impl<S: MetadataSource> VpfConfigApi<S> {
    pub fn new(source: S, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn load_config(&self) -> Result<VpfConfConfig> {
        VpfConfConfig::load(&self.config_dir)
    }

    fn effective_config(&self, overrides: &Overrides) -> Result<VpfConfConfig> {
        let mut config = self.load_config()?;
        if let Some(show_all) = overrides.show_all {
            config.show_all = show_all;
        }
        if let Some(search) = overrides.search_by_feature {
            config.search_by_feature = search;
        }
        for (key, value) in &overrides.style {
            config.style.set(key, value)?;
        }
        Ok(config)
    }

    pub fn tree(&self, paths: &[PathBuf], overrides: &Overrides) -> Result<CmdResult> {
        let config = self.effective_config(overrides)?;
        crate::commands::tree::run(
            &self.source,
            paths,
            LoadOptions {
                show_all: config.show_all,
            },
        )
    }

    pub fn properties<I: AsRef<str>>(
        &self,
        paths: &[PathBuf],
        selectors: &[I],
        overrides: &Overrides,
    ) -> Result<CmdResult> {
        let config = self.effective_config(overrides)?;
        let request = PropertiesRequest {
            selectors: selectors.iter().map(|s| s.as_ref().to_string()).collect(),
            style: config.style,
            search_by_feature: config.search_by_feature,
            show_all: config.show_all,
        };
        crate::commands::properties::run(&self.source, paths, &request)
    }

    /// Start a picker session whose layers go to an in-memory registry.
    pub fn session(&self, paths: &[PathBuf], overrides: &Overrides) -> Result<Session> {
        self.session_with(paths, overrides, LayerRegistry::new())
    }

    pub fn session_with<H: LayerHandler>(
        &self,
        paths: &[PathBuf],
        overrides: &Overrides,
        handler: H,
    ) -> Result<Session<H>> {
        let config = self.effective_config(overrides)?;
        let catalog = FeatureCatalog::load(
            &self.source,
            paths,
            LoadOptions {
                show_all: config.show_all,
            },
        )?;
        Ok(Session::new(
            catalog,
            config.style,
            config.search_by_feature,
            handler,
        ))
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        crate::commands::config::run(&self.config_dir, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VpfError;
    use crate::source::memory::fixtures::{political, DATA_PATH};
    use tempfile::TempDir;

    fn api() -> (TempDir, VpfConfigApi<crate::source::memory::InMemorySource>) {
        let dir = TempDir::new().unwrap();
        let api = VpfConfigApi::new(political(), dir.path());
        (dir, api)
    }

    fn paths() -> Vec<PathBuf> {
        vec![PathBuf::from(DATA_PATH)]
    }

    #[test]
    fn test_tree_dispatches_with_catalog() {
        let (_dir, api) = api();
        let result = api.tree(&paths(), &Overrides::default()).unwrap();
        assert_eq!(result.catalog.unwrap().feature_count(), 3);
    }

    #[test]
    fn test_properties_use_stored_style_and_overrides() {
        let (_dir, api) = api();
        api.config(ConfigAction::Set("line-width".into(), "3".into()))
            .unwrap();
        api.config(ConfigAction::Set("search-by-feature".into(), "false".into()))
            .unwrap();

        let overrides = Overrides {
            style: vec![("lineColor".into(), "ff0000".into())],
            ..Default::default()
        };
        let bag = api
            .properties(&paths(), &["L1/C1/road"], &overrides)
            .unwrap()
            .layer
            .unwrap()
            .properties;
        assert_eq!(bag.get("road.lineWidth"), Some("3"));
        assert_eq!(bag.get("road.lineColor"), Some("ffff0000"));
        assert_eq!(bag.get("searchByFeature"), Some("false"));
    }

    #[test]
    fn test_bad_override_is_error() {
        let (_dir, api) = api();
        let overrides = Overrides {
            style: vec![("lineColor".into(), "teal".into())],
            ..Default::default()
        };
        let err = api.properties(&paths(), &["road"], &overrides).unwrap_err();
        assert!(matches!(err, VpfError::InvalidColor(_)));
    }

    #[test]
    fn test_session_starts_with_configured_style() {
        let (_dir, api) = api();
        api.config(ConfigAction::Set("fill-color".into(), "80ffffff".into()))
            .unwrap();
        let session = api.session(&paths(), &Overrides::default()).unwrap();
        assert_eq!(session.style().fill_color.to_string(), "80ffffff");
        assert_eq!(session.catalog().feature_count(), 3);
    }
}
