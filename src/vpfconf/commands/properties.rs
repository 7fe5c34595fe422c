//! Non-interactive layer building: every selector is resolved against the
//! catalog and added with the same style, then the selection is finalized.

use crate::catalog::{FeatureCatalog, LoadOptions};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::selection::{LayerSettings, SelectionAccumulator};
use crate::source::MetadataSource;
use crate::style::StyleAttributes;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct PropertiesRequest {
    /// `library/coverage/feature` selectors, in the order to add them.
    pub selectors: Vec<String>,
    pub style: StyleAttributes,
    pub search_by_feature: bool,
    pub show_all: bool,
}

pub fn run<S: MetadataSource + ?Sized>(
    source: &S,
    paths: &[PathBuf],
    request: &PropertiesRequest,
) -> Result<CmdResult> {
    let catalog = FeatureCatalog::load(
        source,
        paths,
        LoadOptions {
            show_all: request.show_all,
        },
    )?;

    let mut result = CmdResult::default();
    let mut selection = SelectionAccumulator::new();
    for selector in &request.selectors {
        let feature = catalog.find(selector)?;
        let duplicate = selection
            .features()
            .iter()
            .any(|s| s.feature == *feature);
        if duplicate {
            result.add_message(CmdMessage::warning(format!(
                "{} selected more than once, ignoring repeat",
                selector
            )));
            continue;
        }
        selection.add_feature(feature.clone(), &request.style);
    }

    let settings = LayerSettings::for_catalog(&catalog, request.search_by_feature);
    let bag = selection.finalize(&settings)?;
    Ok(result.with_layer(None, bag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VpfError;
    use crate::source::memory::fixtures::{political, DATA_PATH};

    fn request(selectors: &[&str]) -> PropertiesRequest {
        PropertiesRequest {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            search_by_feature: true,
            ..Default::default()
        }
    }

    fn paths() -> Vec<PathBuf> {
        vec![PathBuf::from(DATA_PATH)]
    }

    #[test]
    fn test_builds_layer_from_selectors() {
        let result = run(&political(), &paths(), &request(&["L1/C1/road", "L1/C1/lake"])).unwrap();
        let bag = result.layer.unwrap().properties;
        assert_eq!(bag.get("vpfPath"), Some(DATA_PATH));
        assert_eq!(bag.get("coverageType"), Some("C1"));
        assert_eq!(bag.get("featureTypes"), Some("edge area"));
        assert_eq!(bag.get("edge"), Some("road"));
        assert_eq!(bag.get("area"), Some("lake"));
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_repeated_selector_is_added_once() {
        let result = run(&political(), &paths(), &request(&["L1/C1/city", "C1/city"])).unwrap();
        assert_eq!(result.layer.unwrap().properties.get("point"), Some("city"));
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn test_style_applies_to_every_feature() {
        let mut req = request(&["road", "city"]);
        req.style.set("lineWidth", "2").unwrap();
        let bag = run(&political(), &paths(), &req).unwrap().layer.unwrap().properties;
        assert_eq!(bag.get("road.lineWidth"), Some("2"));
        assert_eq!(bag.get("city.lineWidth"), Some("2"));
    }

    #[test]
    fn test_unknown_feature_fails() {
        let err = run(&political(), &paths(), &request(&["L1/C1/river"])).unwrap_err();
        assert!(matches!(err, VpfError::FeatureNotFound(_)));
    }

    #[test]
    fn test_no_selectors_is_empty_selection() {
        let err = run(&political(), &paths(), &request(&[])).unwrap_err();
        assert!(matches!(err, VpfError::EmptySelection));
    }
}
