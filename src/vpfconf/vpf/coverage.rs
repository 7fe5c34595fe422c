use super::find_entry;
use super::table::Table;
use crate::error::{Result, VpfError};
use std::path::{Path, PathBuf};

const CAT: &str = "cat";
const COVERAGE_NAME: &str = "coverage_name";
const DESCRIPTION: &str = "description";
const TILEREF: &str = "tileref";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageEntry {
    pub name: String,
    pub description: String,
}

/// The per-library table of coverages.
#[derive(Debug, Clone)]
pub struct CoverageAttributeTable {
    library_dir: PathBuf,
    entries: Vec<CoverageEntry>,
    tiled: bool,
}

impl CoverageAttributeTable {
    pub fn open(library_dir: impl AsRef<Path>) -> Result<Self> {
        let library_dir = library_dir.as_ref();
        let cat_path = find_entry(library_dir, CAT).ok_or_else(|| {
            VpfError::format(library_dir, "no coverage attribute table (cat)")
        })?;
        let table = Table::open(&cat_path)?;
        let name_col = table.require_column(COVERAGE_NAME)?;
        let desc_col = table.column_index(DESCRIPTION);

        let mut entries = Vec::with_capacity(table.len());
        for row in table.rows() {
            let name = table.text(row, name_col)?.to_string();
            if name.is_empty() {
                continue;
            }
            let description = match desc_col {
                Some(c) => table.text(row, c)?.to_string(),
                None => name.clone(),
            };
            entries.push(CoverageEntry { name, description });
        }

        let tiled = find_entry(library_dir, TILEREF).is_some_and(|p| p.is_dir());

        Ok(Self {
            library_dir: library_dir.to_path_buf(),
            entries,
            tiled,
        })
    }

    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    pub fn coverages(&self) -> &[CoverageEntry] {
        &self.entries
    }

    pub fn coverage_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn description(&self, coverage: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == coverage)
            .map(|e| e.description.as_str())
    }

    /// Whether the library's primitives are split into spatial tiles.
    pub fn is_tiled(&self) -> bool {
        self.tiled
    }

    pub fn coverage_dir(&self, coverage: &str) -> Option<PathBuf> {
        find_entry(&self.library_dir, coverage).filter(|p| p.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;
    use crate::vpf::builder::DatabaseBuilder;

    #[test]
    fn test_reads_coverages_and_descriptions() {
        let db = DatabaseBuilder::new()
            .library("eurnasia", |l| {
                l.coverage("bnd", "Boundaries", |c| c)
                    .coverage("trans", "Transportation", |c| c)
            });
        let env = TestEnv::new(db);
        let cat = CoverageAttributeTable::open(env.root().join("eurnasia")).unwrap();
        assert_eq!(cat.coverage_names().collect::<Vec<_>>(), ["bnd", "trans"]);
        assert_eq!(cat.description("trans"), Some("Transportation"));
        assert_eq!(cat.description("hydro"), None);
        assert!(!cat.is_tiled());
        assert!(cat.coverage_dir("bnd").is_some());
    }

    #[test]
    fn test_tileref_directory_marks_tiled_library() {
        let db = DatabaseBuilder::new()
            .library("eurnasia", |l| l.tiled().coverage("bnd", "Boundaries", |c| c));
        let env = TestEnv::new(db);
        let cat = CoverageAttributeTable::open(env.root().join("eurnasia")).unwrap();
        assert!(cat.is_tiled());
    }
}
