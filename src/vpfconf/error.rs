use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VpfError {
    #[error("Malformed VPF data at {}: {detail}", path.display())]
    CatalogFormat { path: PathBuf, detail: String },

    #[error("No feature selected")]
    NoSelection,

    #[error("No features selected for new layer")]
    EmptySelection,

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid feature selector '{0}' (expected library/coverage/feature)")]
    InvalidSelector(String),

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Invalid property line {line}: {content}")]
    InvalidProperty { line: usize, content: String },

    #[error("Invalid color '{0}' (expected rrggbb or aarrggbb hex)")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl VpfError {
    pub fn format(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        VpfError::CatalogFormat {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Errors a caller can report and carry on from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VpfError::NoSelection
                | VpfError::EmptySelection
                | VpfError::FeatureNotFound(_)
                | VpfError::InvalidSelector(_)
                | VpfError::InvalidColor(_)
                | VpfError::UnknownCommand(_)
                | VpfError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VpfError>;
