use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Nothing can be validated without tokens to compare against.
    #[error("token catalog is empty or could not be loaded")]
    CatalogUnavailable,
    #[error("invalid token catalog: {0}")]
    CatalogFormat(#[from] serde_json::Error),
    #[error("invalid rule table: {0}")]
    RuleFormat(#[from] serde_yaml::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
