use crate::catalog::{FeatureCatalog, LoadOptions};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::source::MetadataSource;
use std::path::PathBuf;

pub fn run<S: MetadataSource + ?Sized>(
    source: &S,
    paths: &[PathBuf],
    options: LoadOptions,
) -> Result<CmdResult> {
    let catalog = FeatureCatalog::load(source, paths, options)?;
    let mut result = CmdResult::default();

    if catalog.is_empty() {
        result.add_message(CmdMessage::warning("No libraries found."));
    } else {
        let coverages: usize = catalog.libraries().iter().map(|l| l.coverages.len()).sum();
        result.add_message(CmdMessage::info(format!(
            "{} libraries, {} coverages, {} features",
            catalog.libraries().len(),
            coverages,
            catalog.feature_count()
        )));
    }

    Ok(result.with_catalog(catalog))
}
