use crate::vpf::builder::DatabaseBuilder;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    // Keeps the directory alive until the test is done
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    /// Write `db` into a fresh temporary directory.
    pub fn new(db: DatabaseBuilder) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().join("vmap");
        db.write(&root).expect("failed to write VPF database");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// The single-library catalog used across tests: `L1/C1` with an edge, a
/// point and an area feature.
pub fn political_db() -> DatabaseBuilder {
    DatabaseBuilder::new().library("L1", |l| {
        l.coverage("C1", "Political", |c| {
            c.feature("road", "Roads", 'L')
                .feature("city", "Cities", 'P')
                .feature("lake", "Lakes", 'A')
        })
    })
}
