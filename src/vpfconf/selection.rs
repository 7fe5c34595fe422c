//! # Selection Accumulator
//!
//! Collects the features a user chooses for one new layer, each with the style
//! in force when it was added, and turns the collection into a layer
//! [`PropertyBag`].
//!
//! The interactive flow has one pending feature at a time (the picker):
//!
//! ```text
//! pick(road) ─► add(style) ─► pick(city) ─► add(style) ─► finalize() ─► PropertyBag
//! ```
//!
//! Coverage names and type categories are kept in first-seen order, so the
//! same sequence of additions always yields the same bag.

use crate::catalog::FeatureCatalog;
use crate::error::{Result, VpfError};
use crate::model::{Feature, FeatureType, SelectedFeature};
use crate::properties::{
    string_together, PropertyBag, COVERAGE_TYPE_PROPERTY, FEATURE_TYPES_PROPERTY,
    PATH_PROPERTY, SEARCH_BY_FEATURE_PROPERTY,
};
use crate::style::StyleAttributes;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info};

/// Layer-wide values written ahead of the per-feature entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSettings {
    /// Database paths, already joined with `;`.
    pub path_list: String,
    pub search_by_feature: bool,
}

impl LayerSettings {
    pub fn new(path_list: impl Into<String>, search_by_feature: bool) -> Self {
        Self {
            path_list: path_list.into(),
            search_by_feature,
        }
    }

    pub fn for_catalog(catalog: &FeatureCatalog, search_by_feature: bool) -> Self {
        Self::new(catalog.path_list(), search_by_feature)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionAccumulator {
    pending: Option<Feature>,
    selected: Vec<SelectedFeature>,
    coverage_names: IndexSet<String>,
    feature_types: IndexSet<FeatureType>,
}

impl SelectionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `feature` the pending feature, replacing any earlier pick.
    pub fn pick(&mut self, feature: Feature) {
        debug!(feature = %feature.name, "picked");
        self.pending = Some(feature);
    }

    pub fn unpick(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&Feature> {
        self.pending.as_ref()
    }

    /// Add the pending feature with a copy of `style`.
    pub fn add(&mut self, style: &StyleAttributes) -> Result<&SelectedFeature> {
        let feature = self.pending.take().ok_or(VpfError::NoSelection)?;
        Ok(self.push(feature, style))
    }

    /// Add a feature directly, bypassing the picker.
    pub fn add_feature(&mut self, feature: Feature, style: &StyleAttributes) -> &SelectedFeature {
        self.push(feature, style)
    }

    fn push(&mut self, feature: Feature, style: &StyleAttributes) -> &SelectedFeature {
        self.coverage_names.insert(feature.coverage.clone());
        self.feature_types.insert(feature.feature_type);
        debug!(
            feature = %feature.name,
            coverage = %feature.coverage,
            feature_type = %feature.feature_type,
            "added to selection"
        );
        let index = self.selected.len();
        self.selected.push(SelectedFeature {
            feature,
            style: style.clone(),
        });
        &self.selected[index]
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.coverage_names.clear();
        self.feature_types.clear();
    }

    pub fn features(&self) -> &[SelectedFeature] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn coverage_names(&self) -> &IndexSet<String> {
        &self.coverage_names
    }

    pub fn feature_types(&self) -> &IndexSet<FeatureType> {
        &self.feature_types
    }

    /// Build the layer bag and start a fresh selection.
    ///
    /// An empty selection fails with [`VpfError::EmptySelection`] and leaves
    /// the accumulator untouched.
    pub fn finalize(&mut self, settings: &LayerSettings) -> Result<PropertyBag> {
        let bag = self.build(settings)?;
        self.clear();
        Ok(bag)
    }

    /// The layer properties of the current selection, leaving it in place.
    pub fn build(&self, settings: &LayerSettings) -> Result<PropertyBag> {
        if self.selected.is_empty() {
            return Err(VpfError::EmptySelection);
        }

        let mut buckets: IndexMap<FeatureType, IndexSet<&str>> = IndexMap::new();
        let mut styles = PropertyBag::new();
        for selected in &self.selected {
            let feature = &selected.feature;
            buckets
                .entry(feature.feature_type)
                .or_default()
                .insert(feature.name.as_str());
            selected.style.write_properties(&feature.name, &mut styles);
        }

        let mut bag = PropertyBag::new();
        bag.insert(PATH_PROPERTY, settings.path_list.as_str());
        bag.insert(
            SEARCH_BY_FEATURE_PROPERTY,
            settings.search_by_feature.to_string(),
        );
        bag.insert(COVERAGE_TYPE_PROPERTY, string_together(&self.coverage_names));
        bag.insert(
            FEATURE_TYPES_PROPERTY,
            string_together(self.feature_types.iter().map(FeatureType::name)),
        );
        for (ft, names) in &buckets {
            bag.insert(ft.name(), string_together(names));
        }
        for (key, value) in styles.iter() {
            bag.insert(key, value);
        }

        info!(
            features = self.selected.len(),
            coverages = %bag.get(COVERAGE_TYPE_PROPERTY).unwrap_or_default(),
            "built layer properties"
        );
        Ok(bag)
    }
}
