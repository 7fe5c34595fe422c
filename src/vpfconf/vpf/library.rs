use super::find_entry;
use super::table::Table;
use crate::error::{Result, VpfError};
use std::path::{Path, PathBuf};

const LAT: &str = "lat";
const LIBRARY_NAME: &str = "library_name";

/// The database-level table listing the libraries under a VPF root.
#[derive(Debug, Clone)]
pub struct LibrarySelectionTable {
    root: PathBuf,
    names: Vec<String>,
}

impl LibrarySelectionTable {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(VpfError::format(root, "not a VPF database directory"));
        }
        let lat_path = find_entry(root, LAT)
            .ok_or_else(|| VpfError::format(root, "no library attribute table (lat)"))?;
        let table = Table::open(&lat_path)?;
        let col = table.require_column(LIBRARY_NAME)?;

        let names = table
            .rows()
            .map(|row| table.text(row, col).map(str::to_string))
            .filter(|name| !matches!(name, Ok(n) if n.is_empty()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            names,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn library_names(&self) -> &[String] {
        &self.names
    }

    pub fn library_dir(&self, library: &str) -> Result<PathBuf> {
        find_entry(&self.root, library)
            .filter(|p| p.is_dir())
            .ok_or_else(|| {
                VpfError::format(
                    self.root.join(library),
                    "library listed in lat has no directory",
                )
            })
    }
}
