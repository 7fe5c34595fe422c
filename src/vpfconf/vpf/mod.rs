//! # VPF Metadata Tables
//!
//! A VPF database is a directory tree of self-describing binary tables:
//!
//! ```text
//! <root>/
//! ├── lat                  Library Attribute Table (library names)
//! └── <library>/
//!     ├── cat              Coverage Attribute Table (coverage names, descriptions)
//!     ├── tileref/         present when the library is spatially tiled
//!     └── <coverage>/
//!         ├── fcs          Feature Class Schema (feature tables → primitive tables)
//!         ├── fca          Feature Class Attributes (class, type, description)
//!         └── <class>.aft  feature tables (.aft .lft .tft .pft .cft)
//! ```
//!
//! Only the metadata tables are read here; primitive geometry never is.
//! Published data sets use either lower or upper case file names, and ISO 9660
//! copies often carry a trailing dot, so every lookup goes through
//! [`find_entry`].

use std::path::{Path, PathBuf};

pub mod builder;
pub mod coverage;
pub mod feature;
pub mod library;
pub mod table;

pub use builder::DatabaseBuilder;
pub use coverage::CoverageAttributeTable;
pub use feature::{FeatureClassAttributes, FeatureClassSchema};
pub use library::LibrarySelectionTable;
pub use table::{Column, Count, FieldKind, Table, TableWriter, Value};

/// Locate `name` inside `dir`, tolerating case and a trailing `.`.
pub fn find_entry(dir: &Path, name: &str) -> Option<PathBuf> {
    let lower = name.to_ascii_lowercase();
    let upper = name.to_ascii_uppercase();
    [
        name.to_string(),
        lower.clone(),
        upper.clone(),
        format!("{}.", lower),
        format!("{}.", upper),
    ]
    .into_iter()
    .map(|candidate| dir.join(candidate))
    .find(|p| p.exists())
}
