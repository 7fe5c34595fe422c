use super::{CoverageEntry, MetadataSource};
use crate::error::{Result, VpfError};
use crate::model::FeatureRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
struct MemLibrary {
    name: String,
    tiled: bool,
    coverages: Vec<(CoverageEntry, Vec<FeatureRecord>)>,
}

/// In-memory metadata for testing. Databases are keyed by path; asking for an
/// unknown path, library or coverage fails like malformed data would.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    databases: HashMap<PathBuf, Vec<MemLibrary>>,
    broken: HashMap<PathBuf, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_library(&mut self, path: impl AsRef<Path>, name: &str, tiled: bool) -> &mut Self {
        self.databases
            .entry(path.as_ref().to_path_buf())
            .or_default()
            .push(MemLibrary {
                name: name.to_string(),
                tiled,
                coverages: Vec::new(),
            });
        self
    }

    pub fn add_coverage(
        &mut self,
        path: impl AsRef<Path>,
        library: &str,
        name: &str,
        description: &str,
    ) -> &mut Self {
        if let Some(lib) = self.library_mut(path.as_ref(), library) {
            lib.coverages.push((
                CoverageEntry {
                    name: name.to_string(),
                    description: description.to_string(),
                },
                Vec::new(),
            ));
        }
        self
    }

    pub fn add_feature(
        &mut self,
        path: impl AsRef<Path>,
        library: &str,
        coverage: &str,
        record: FeatureRecord,
    ) -> &mut Self {
        if let Some(lib) = self.library_mut(path.as_ref(), library) {
            if let Some((_, features)) = lib.coverages.iter_mut().find(|(c, _)| c.name == coverage)
            {
                features.push(record);
            }
        }
        self
    }

    /// Make every lookup under `path` fail with a format error.
    pub fn break_database(&mut self, path: impl AsRef<Path>, detail: &str) -> &mut Self {
        self.broken
            .insert(path.as_ref().to_path_buf(), detail.to_string());
        self
    }

    fn library_mut(&mut self, path: &Path, name: &str) -> Option<&mut MemLibrary> {
        self.databases
            .get_mut(path)
            .and_then(|libs| libs.iter_mut().find(|l| l.name == name))
    }

    fn database(&self, path: &Path) -> Result<&[MemLibrary]> {
        if let Some(detail) = self.broken.get(path) {
            return Err(VpfError::format(path, detail.clone()));
        }
        self.databases
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| VpfError::format(path, "no such database"))
    }

    fn library(&self, path: &Path, name: &str) -> Result<&MemLibrary> {
        self.database(path)?
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| VpfError::format(path.join(name), "no such library"))
    }
}

impl MetadataSource for InMemorySource {
    fn list_libraries(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.database(path)?.iter().map(|l| l.name.clone()).collect())
    }

    fn list_coverages(&self, path: &Path, library: &str) -> Result<Vec<CoverageEntry>> {
        Ok(self
            .library(path, library)?
            .coverages
            .iter()
            .map(|(c, _)| c.clone())
            .collect())
    }

    fn list_features(
        &self,
        path: &Path,
        library: &str,
        coverage: &str,
    ) -> Result<Vec<FeatureRecord>> {
        self.library(path, library)?
            .coverages
            .iter()
            .find(|(c, _)| c.name == coverage)
            .map(|(_, f)| f.clone())
            .ok_or_else(|| VpfError::format(path.join(library).join(coverage), "no such coverage"))
    }

    fn is_tiled(&self, path: &Path, library: &str) -> Result<bool> {
        Ok(self.library(path, library)?.tiled)
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::InMemorySource;
    use crate::model::{FeatureRecord, FeatureType};

    pub const DATA_PATH: &str = "/data/vmaplv0";

    /// Library `L1`, coverage `C1` ("Political") with road (edge), city
    /// (point) and lake (area).
    pub fn political() -> InMemorySource {
        let mut source = InMemorySource::new();
        source
            .add_library(DATA_PATH, "L1", false)
            .add_coverage(DATA_PATH, "L1", "C1", "Political")
            .add_feature(
                DATA_PATH,
                "L1",
                "C1",
                FeatureRecord::new("road", "Roads", FeatureType::Edge),
            )
            .add_feature(
                DATA_PATH,
                "L1",
                "C1",
                FeatureRecord::new("city", "Cities", FeatureType::Point),
            )
            .add_feature(
                DATA_PATH,
                "L1",
                "C1",
                FeatureRecord::new("lake", "Lakes", FeatureType::Area),
            );
        source
    }
}
