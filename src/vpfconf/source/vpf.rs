use super::{CoverageEntry, MetadataSource};
use crate::error::{Result, VpfError};
use crate::model::FeatureRecord;
use crate::vpf::feature::read_feature_records;
use crate::vpf::{CoverageAttributeTable, LibrarySelectionTable};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// Reads catalogs from VPF databases on disk.
///
/// Each `lat` and `cat` is decoded once per source and reused by the later
/// lookups into the same database or library. Failed reads are not cached.
#[derive(Debug, Default)]
pub struct VpfSource {
    lats: RefCell<HashMap<PathBuf, Rc<LibrarySelectionTable>>>,
    cats: RefCell<HashMap<(PathBuf, String), Rc<CoverageAttributeTable>>>,
}

impl VpfSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn lat(&self, path: &Path) -> Result<Rc<LibrarySelectionTable>> {
        if let Some(lat) = self.lats.borrow().get(path) {
            return Ok(Rc::clone(lat));
        }
        let lat = Rc::new(LibrarySelectionTable::open(path)?);
        self.lats
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&lat));
        Ok(lat)
    }

    fn cat(&self, path: &Path, library: &str) -> Result<Rc<CoverageAttributeTable>> {
        let key = (path.to_path_buf(), library.to_string());
        if let Some(cat) = self.cats.borrow().get(&key) {
            return Ok(Rc::clone(cat));
        }
        let lib_dir = self.lat(path)?.library_dir(library)?;
        let cat = Rc::new(CoverageAttributeTable::open(lib_dir)?);
        self.cats.borrow_mut().insert(key, Rc::clone(&cat));
        Ok(cat)
    }
}

impl MetadataSource for VpfSource {
    fn list_libraries(&self, path: &Path) -> Result<Vec<String>> {
        let lat = self.lat(path)?;
        debug!(path = %path.display(), libraries = lat.library_names().len(), "opened database");
        Ok(lat.library_names().to_vec())
    }

    fn list_coverages(&self, path: &Path, library: &str) -> Result<Vec<CoverageEntry>> {
        Ok(self.cat(path, library)?.coverages().to_vec())
    }

    fn list_features(
        &self,
        path: &Path,
        library: &str,
        coverage: &str,
    ) -> Result<Vec<FeatureRecord>> {
        let cat = self.cat(path, library)?;
        let dir = cat.coverage_dir(coverage).ok_or_else(|| {
            VpfError::format(
                cat.library_dir().join(coverage),
                "coverage listed in cat has no directory",
            )
        })?;
        read_feature_records(&dir)
    }

    fn is_tiled(&self, path: &Path, library: &str) -> Result<bool> {
        Ok(self.cat(path, library)?.is_tiled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureType;
    use crate::test_utils::{political_db, TestEnv};
    use std::fs;

    #[test]
    fn test_walks_database_hierarchy() {
        let env = TestEnv::new(political_db());
        let source = VpfSource::new();

        assert_eq!(source.list_libraries(env.root()).unwrap(), ["L1"]);
        let coverages = source.list_coverages(env.root(), "L1").unwrap();
        assert_eq!(coverages.len(), 1);
        assert_eq!(coverages[0].description, "Political");

        let features = source.list_features(env.root(), "L1", "C1").unwrap();
        let types: Vec<_> = features.iter().map(|f| f.feature_type).collect();
        assert_eq!(
            types,
            vec![FeatureType::Edge, FeatureType::Point, FeatureType::Area]
        );
        assert!(!source.is_tiled(env.root(), "L1").unwrap());
    }

    #[test]
    fn test_coverage_without_directory_is_format_error() {
        let env = TestEnv::new(political_db());
        fs::remove_dir_all(env.root().join("L1").join("C1")).unwrap();
        let err = VpfSource::new()
            .list_features(env.root(), "L1", "C1")
            .unwrap_err();
        assert!(matches!(err, VpfError::CatalogFormat { .. }));
    }

    #[test]
    fn test_corrupt_cat_is_format_error_with_path() {
        let env = TestEnv::new(political_db());
        let cat = env.root().join("L1").join("cat");
        fs::write(&cat, b"\x05\x00\x00\x00L;x").unwrap();
        let err = VpfSource::new().list_coverages(env.root(), "L1").unwrap_err();
        match err {
            VpfError::CatalogFormat { path, .. } => assert_eq!(path, cat),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_library_tables_are_read_once() {
        let env = TestEnv::new(political_db());
        let source = VpfSource::new();
        assert_eq!(source.list_coverages(env.root(), "L1").unwrap().len(), 1);

        // Later lookups are served from the tables already decoded.
        fs::remove_file(env.root().join("lat")).unwrap();
        fs::remove_file(env.root().join("L1").join("cat")).unwrap();
        assert_eq!(source.list_libraries(env.root()).unwrap(), ["L1"]);
        assert!(!source.is_tiled(env.root(), "L1").unwrap());
        assert_eq!(source.list_features(env.root(), "L1", "C1").unwrap().len(), 3);

        let err = VpfSource::new().list_libraries(env.root()).unwrap_err();
        assert!(matches!(err, VpfError::CatalogFormat { .. }));
    }
}
