use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VsmError>;

#[derive(Error, Debug)]
pub enum VsmError {
    /// No documents, or documents without a single term: idf is undefined.
    #[error("empty corpus: no documents or no terms to build a vocabulary from")]
    EmptyCorpus,

    #[error("vector for document '{id}' has dimension {found}, vocabulary has {expected}")]
    DimensionMismatch { id: String, expected: usize, found: usize },

    /// Persisted artifacts disagree with each other or with the vocabulary.
    #[error("stale store: {what} is {found}, expected {expected}; rebuild the store")]
    StaleStore { what: &'static str, expected: usize, found: usize },

    #[error("unknown document '{0}'")]
    UnknownDocument(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("meta file error: {0}")]
    Meta(#[from] serde_json::Error),
}

impl VsmError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VsmError::Io { path: path.into(), source }
    }
}
