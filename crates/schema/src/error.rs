use std::path::PathBuf;

/// Errors from refreshing the schema corpus.
///
/// Lookups never produce these; a failed lookup is reported as text.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to download schema bundle from {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Schema bundle request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid schema bundle archive: {0}")]
    Archive(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write schema {file}: {reason}")]
    Write { file: String, reason: String },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
