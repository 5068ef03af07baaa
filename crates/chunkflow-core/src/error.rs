//! Error types for chunk reduction

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core chunking errors
#[derive(Debug, Error)]
pub enum Error {
    /// The requested tokenizer model could not be resolved to an encoding
    #[error("Unknown tokenizer model '{model}': {message}")]
    UnknownModel { model: String, message: String },

    /// A token sequence could not be decoded back to text
    #[error("Token decode failed: {0}")]
    Decode(String),

    /// A combine strategy violated its contract
    #[error("Combine strategy error: {0}")]
    Strategy(String),
}

impl Error {
    /// Create an unknown-model error
    pub fn unknown_model(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnknownModel {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a strategy error
    pub fn strategy(message: impl Into<String>) -> Self {
        Self::Strategy(message.into())
    }
}
