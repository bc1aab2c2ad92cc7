use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("pdf extraction failed: {0}")]
    Pdf(String),

    #[error("file is not valid utf-8: {0}")]
    Encoding(String),

    #[error("could not extract text from {0}")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("path has no file name: {0}")]
    MissingFileName(String),
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyword config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid section name: {0:?}")]
    InvalidSection(String),

    #[error("invalid keyword list for section {section}: {details}")]
    InvalidKeywords { section: String, details: String },

    #[error("keyword config defines no sections")]
    Empty,

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {0}")]
    MissingDirectory(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{file_name} maps to {record}, already written in this batch")]
    RecordCollision { file_name: String, record: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
