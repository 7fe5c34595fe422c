use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vpfconf::vpf::DatabaseBuilder;

/// A VPF database and a private config dir in one temp directory.
pub struct CliEnv {
    _temp_dir: TempDir,
    db: PathBuf,
    config: PathBuf,
}

impl CliEnv {
    pub fn new(db: DatabaseBuilder) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("vmaplv0");
        db.write(&root).unwrap();
        let config = temp_dir.path().join("config");
        Self {
            _temp_dir: temp_dir,
            db: root,
            config,
        }
    }

    pub fn political() -> Self {
        Self::new(DatabaseBuilder::new().library("L1", |l| {
            l.coverage("C1", "Political", |c| {
                c.feature("road", "Roads", 'L')
                    .feature("city", "Cities", 'P')
                    .feature("lake", "Lakes", 'A')
            })
        }))
    }

    pub fn db(&self) -> &Path {
        &self.db
    }

    pub fn config_dir(&self) -> &Path {
        &self.config
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("vpfconf").unwrap();
        cmd.env("VPFCONF_CONFIG_DIR", &self.config)
            .env_remove("VPFCONF_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}
