//! # Feature Catalog
//!
//! A read-only three-level view (library → coverage → feature) over one or
//! more VPF databases, built once from a [`MetadataSource`].
//!
//! ## Load rules
//!
//! - Libraries appear in input-path order, then table order; coverages and
//!   features in table order.
//! - Feature records carrying the skip marker are dropped.
//! - A coverage left with no features is kept only when `show_all` is set or
//!   its library is not tiled. Tiled data lists every coverage for every
//!   library, so empty ones there are dead branches.
//! - The first malformed source aborts the whole load.

use crate::error::{Result, VpfError};
use crate::model::{CatalogNode, Coverage, Feature, Library};
use crate::source::MetadataSource;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator of the database paths in the layer path property.
pub const PATH_SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub show_all: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureCatalog {
    paths: Vec<PathBuf>,
    libraries: Vec<Library>,
}

impl FeatureCatalog {
    pub fn load<S, P>(source: &S, paths: &[P], options: LoadOptions) -> Result<Self>
    where
        S: MetadataSource + ?Sized,
        P: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        let mut libraries = Vec::new();

        for path in &paths {
            for name in source.list_libraries(path)? {
                let tiled = source.is_tiled(path, &name)?;
                let mut coverages = Vec::new();

                for entry in source.list_coverages(path, &name)? {
                    let features: Vec<Feature> = source
                        .list_features(path, &name, &entry.name)?
                        .into_iter()
                        .filter(|r| !r.skip)
                        .map(|r| Feature {
                            name: r.name,
                            description: r.description,
                            feature_type: r.feature_type,
                            coverage: entry.name.clone(),
                        })
                        .collect();

                    if features.is_empty() && tiled && !options.show_all {
                        debug!(library = %name, coverage = %entry.name, "pruned empty tiled coverage");
                        continue;
                    }
                    coverages.push(Coverage {
                        name: entry.name,
                        description: entry.description,
                        features,
                    });
                }

                debug!(library = %name, coverages = coverages.len(), tiled, "loaded library");
                libraries.push(Library {
                    name,
                    path: path.clone(),
                    tiled,
                    coverages,
                });
            }
        }

        Ok(Self { paths, libraries })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Database paths joined with `;`.
    pub fn path_list(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string())
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|l| l.name == name)
    }

    pub fn coverages(&self, library: &str) -> &[Coverage] {
        self.library(library)
            .map(|l| l.coverages.as_slice())
            .unwrap_or_default()
    }

    pub fn features(&self, library: &str, coverage: &str) -> &[Feature] {
        self.coverages(library)
            .iter()
            .find(|c| c.name == coverage)
            .map(|c| c.features.as_slice())
            .unwrap_or_default()
    }

    /// Depth-first walk below the library level.
    pub fn nodes(&self) -> Vec<CatalogNode<'_>> {
        let mut nodes = Vec::new();
        for lib in &self.libraries {
            for cov in &lib.coverages {
                nodes.push(CatalogNode::Coverage {
                    library: &lib.name,
                    name: &cov.name,
                    description: &cov.description,
                });
                nodes.extend(cov.features.iter().map(|feature| CatalogNode::Feature {
                    library: &lib.name,
                    feature,
                }));
            }
        }
        nodes
    }

    pub fn feature_count(&self) -> usize {
        self.libraries
            .iter()
            .flat_map(|l| &l.coverages)
            .map(|c| c.features.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Resolve `library/coverage/feature`, `coverage/feature` or a bare
    /// feature name to the first matching feature.
    pub fn find(&self, selector: &str) -> Result<&Feature> {
        let parts: Vec<&str> = selector.trim().split('/').collect();
        if parts.iter().any(|p| p.is_empty()) || parts.len() > 3 {
            return Err(VpfError::InvalidSelector(selector.to_string()));
        }
        let (lib, cov, feat) = match parts.as_slice() {
            [l, c, f] => (Some(*l), Some(*c), *f),
            [c, f] => (None, Some(*c), *f),
            [f] => (None, None, *f),
            _ => return Err(VpfError::InvalidSelector(selector.to_string())),
        };

        self.libraries
            .iter()
            .filter(|l| lib.map_or(true, |name| l.name == name))
            .flat_map(|l| &l.coverages)
            .filter(|c| cov.map_or(true, |name| c.name == name))
            .flat_map(|c| &c.features)
            .find(|f| f.name == feat)
            .ok_or_else(|| VpfError::FeatureNotFound(selector.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureRecord, FeatureType};
    use crate::source::memory::fixtures::{political, DATA_PATH};
    use crate::source::memory::InMemorySource;
    use crate::source::vpf::VpfSource;
    use crate::test_utils::{political_db, TestEnv};
    use crate::vpf::builder::DatabaseBuilder;

    #[test]
    fn test_loads_three_level_hierarchy() {
        let catalog = FeatureCatalog::load(&political(), &[DATA_PATH], LoadOptions::default())
            .unwrap();
        assert_eq!(catalog.libraries().len(), 1);
        assert_eq!(catalog.coverages("L1")[0].description, "Political");
        let names: Vec<_> = catalog
            .features("L1", "C1")
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["road", "city", "lake"]);
        assert_eq!(catalog.feature_count(), 3);
        assert_eq!(catalog.path_list(), DATA_PATH);
    }

    #[test]
    fn test_skip_marked_records_are_dropped() {
        let mut source = political();
        source.add_feature(
            DATA_PATH,
            "L1",
            "C1",
            FeatureRecord::new("wells", "Wells", FeatureType::Point).skipped(),
        );
        let catalog =
            FeatureCatalog::load(&source, &[DATA_PATH], LoadOptions::default()).unwrap();
        assert_eq!(catalog.feature_count(), 3);
        assert!(catalog.find("wells").is_err());
    }

    fn source_with_empty_coverage(tiled: bool) -> InMemorySource {
        let mut source = InMemorySource::new();
        source
            .add_library("/db", "lib", tiled)
            .add_coverage("/db", "lib", "full", "Full")
            .add_coverage("/db", "lib", "empty", "Empty")
            .add_feature(
                "/db",
                "lib",
                "full",
                FeatureRecord::new("f", "F", FeatureType::Edge),
            )
            .add_feature(
                "/db",
                "lib",
                "empty",
                FeatureRecord::new("gone", "Gone", FeatureType::Edge).skipped(),
            );
        source
    }

    #[test]
    fn test_empty_coverage_pruned_only_for_tiled_data() {
        let opts = LoadOptions::default();

        let tiled = FeatureCatalog::load(&source_with_empty_coverage(true), &["/db"], opts).unwrap();
        let names: Vec<_> = tiled.coverages("lib").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["full"]);

        let untiled =
            FeatureCatalog::load(&source_with_empty_coverage(false), &["/db"], opts).unwrap();
        assert_eq!(untiled.coverages("lib").len(), 2);
    }

    #[test]
    fn test_show_all_keeps_empty_tiled_coverage() {
        let opts = LoadOptions { show_all: true };
        let catalog = FeatureCatalog::load(&source_with_empty_coverage(true), &["/db"], opts).unwrap();
        assert_eq!(catalog.coverages("lib").len(), 2);
        assert!(catalog.features("lib", "empty").is_empty());
    }

    #[test]
    fn test_libraries_follow_input_path_order() {
        let mut source = political();
        source
            .add_library("/data/dnc", "A1", false)
            .add_coverage("/data/dnc", "A1", "hyd", "Hydrography");
        let catalog = FeatureCatalog::load(
            &source,
            &["/data/dnc", DATA_PATH],
            LoadOptions::default(),
        )
        .unwrap();
        let libs: Vec<_> = catalog.libraries().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(libs, vec!["A1", "L1"]);
        assert_eq!(catalog.path_list(), "/data/dnc;/data/vmaplv0");
    }

    #[test]
    fn test_first_bad_source_aborts_load() {
        let mut source = political();
        source.break_database("/broken", "truncated lat");
        let err = FeatureCatalog::load(&source, &[DATA_PATH, "/broken"], LoadOptions::default())
            .unwrap_err();
        match err {
            VpfError::CatalogFormat { path, detail } => {
                assert_eq!(path, PathBuf::from("/broken"));
                assert_eq!(detail, "truncated lat");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nodes_tag_coverages_and_features() {
        let catalog = FeatureCatalog::load(&political(), &[DATA_PATH], LoadOptions::default())
            .unwrap();
        let nodes = catalog.nodes();
        assert_eq!(nodes.len(), 4);
        assert!(matches!(
            nodes[0],
            CatalogNode::Coverage { name: "C1", description: "Political", .. }
        ));
        match &nodes[2] {
            CatalogNode::Feature { library, feature } => {
                assert_eq!(*library, "L1");
                assert_eq!(feature.name, "city");
            }
            other => panic!("expected feature node, got {other:?}"),
        }
    }

    #[test]
    fn test_find_accepts_short_selectors() {
        let catalog = FeatureCatalog::load(&political(), &[DATA_PATH], LoadOptions::default())
            .unwrap();
        assert_eq!(catalog.find("L1/C1/road").unwrap().name, "road");
        assert_eq!(catalog.find("C1/city").unwrap().feature_type, FeatureType::Point);
        assert_eq!(catalog.find("lake").unwrap().coverage, "C1");
        assert!(matches!(
            catalog.find("L2/C1/road"),
            Err(VpfError::FeatureNotFound(_))
        ));
        assert!(matches!(
            catalog.find("L1//road"),
            Err(VpfError::InvalidSelector(_))
        ));
        assert!(matches!(
            catalog.find("a/b/c/d"),
            Err(VpfError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_loads_from_vpf_tables() {
        let env = TestEnv::new(political_db());
        let catalog =
            FeatureCatalog::load(&VpfSource::new(), &[env.root()], LoadOptions::default())
                .unwrap();
        assert_eq!(catalog.feature_count(), 3);
        assert!(!catalog.libraries()[0].tiled);
    }

    #[test]
    fn test_tiled_vpf_library_prunes_coverages_without_features() {
        let db = DatabaseBuilder::new().library("eurnasia", |l| {
            l.tiled()
                .coverage("bnd", "Boundaries", |c| c.feature("polbnda", "Boundary Areas", 'A'))
                .coverage("pop", "Population", |c| {
                    c.described_only("builtupa", "Built-Up Areas", 'A')
                })
        });
        let env = TestEnv::new(db);
        let catalog =
            FeatureCatalog::load(&VpfSource::new(), &[env.root()], LoadOptions::default())
                .unwrap();
        let names: Vec<_> = catalog
            .coverages("eurnasia")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["bnd"]);
    }
}
