//! Error types for source-format extraction

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum Error {
    /// Archive does not have the chat-export layout
    #[error("Not a valid chat export: {0}")]
    InvalidExport(String),

    /// Failed to extract text from a paginated document
    #[error("Failed to extract '{source_name}': {message}")]
    DocumentExtract { source_name: String, message: String },

    /// Zip archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed scan pattern in a metadata schema
    #[error("Invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Malformed prompt template
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// Malformed date in a chat-export day file name
    #[error("Invalid date: {0}")]
    Date(#[from] chrono::ParseError),

    /// Tokenization or reduction error from the core
    #[error(transparent)]
    Core(#[from] chunkflow_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-export error
    pub fn invalid_export(message: impl Into<String>) -> Self {
        Self::InvalidExport(message.into())
    }

    /// Create a document extraction error
    pub fn document_extract(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentExtract {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
