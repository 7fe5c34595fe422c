//! # Metadata Sources
//!
//! The catalog never reads files itself. It asks a [`MetadataSource`] for
//! libraries, coverages and feature records, so the same catalog logic runs
//! over real VPF data or over fixtures.
//!
//! ## Implementations
//!
//! - [`vpf::VpfSource`]: reads the VPF metadata tables under each database path
//!   (`lat`, `cat`, `fcs`, `fca`).
//! - [`memory::InMemorySource`]: hand-assembled hierarchies for testing.
//!
//! Every method takes the database path it concerns; a single source serves
//! any number of databases.

use crate::error::Result;
use crate::model::FeatureRecord;
use std::path::Path;

pub mod memory;
pub mod vpf;

pub use crate::vpf::coverage::CoverageEntry;

pub trait MetadataSource {
    /// Library names of the database at `path`, in table order.
    fn list_libraries(&self, path: &Path) -> Result<Vec<String>>;

    /// Coverages of `library`, in table order.
    fn list_coverages(&self, path: &Path, library: &str) -> Result<Vec<CoverageEntry>>;

    /// Feature class records of a coverage, in table order, skip markers included.
    fn list_features(
        &self,
        path: &Path,
        library: &str,
        coverage: &str,
    ) -> Result<Vec<FeatureRecord>>;

    /// Whether the library's data is spatially tiled.
    fn is_tiled(&self, path: &Path, library: &str) -> Result<bool>;
}
