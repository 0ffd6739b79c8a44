//! Errors raised by the mapping store and its file codec.

use std::path::PathBuf;

/// Mapping store errors.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A required identifier was absent.
    #[error("Missing required {0}")]
    InvalidArgument(&'static str),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted content was malformed. Recovered inside the codec.
    #[error("Malformed mapping file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to encode mappings: {0}")]
    Encode(#[source] serde_json::Error),
}

impl MappingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MappingError::Io {
            path: path.into(),
            source,
        }
    }
}
