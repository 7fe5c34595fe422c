use crate::style::StyleAttributes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Feature-type category of a VPF feature class.
///
/// The canonical name doubles as the layer property key that lists the
/// features of that category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Area,
    Text,
    Edge,
    Point,
    #[serde(rename = "cpoint")]
    ConnectedPoint,
    #[serde(rename = "epoint")]
    EntityPoint,
    Complex,
    Unknown,
}

impl FeatureType {
    pub const ALL: [FeatureType; 8] = [
        FeatureType::Area,
        FeatureType::Text,
        FeatureType::Edge,
        FeatureType::Point,
        FeatureType::ConnectedPoint,
        FeatureType::EntityPoint,
        FeatureType::Complex,
        FeatureType::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureType::Area => "area",
            FeatureType::Text => "text",
            FeatureType::Edge => "edge",
            FeatureType::Point => "point",
            FeatureType::ConnectedPoint => "cpoint",
            FeatureType::EntityPoint => "epoint",
            FeatureType::Complex => "complex",
            FeatureType::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw feature class record as reported by a metadata source, before the
/// catalog applies its skip rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub name: String,
    pub description: String,
    pub feature_type: FeatureType,
    /// The class is described in the metadata but has no feature table.
    pub skip: bool,
}

impl FeatureRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>, ft: FeatureType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            feature_type: ft,
            skip: false,
        }
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub feature_type: FeatureType,
    pub coverage: String,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.feature_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub name: String,
    pub description: String,
    pub features: Vec<Feature>,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Library {
    pub name: String,
    /// The database the library was read from.
    pub path: PathBuf,
    pub tiled: bool,
    pub coverages: Vec<Coverage>,
}

/// A node below the library level of the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogNode<'a> {
    Coverage {
        library: &'a str,
        name: &'a str,
        description: &'a str,
    },
    Feature {
        library: &'a str,
        feature: &'a Feature,
    },
}

/// A feature in the selection, holding the style captured when it was added.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFeature {
    pub feature: Feature,
    pub style: StyleAttributes,
}
