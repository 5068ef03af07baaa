//! The chunk unit flowing through the pipeline

use serde::{Deserialize, Serialize};

/// Token id in the configured encoding
pub type Token = u32;

/// A unit of extracted text plus format-specific metadata
///
/// `encoded` caches the token ids of `text`. When present it must equal
/// `tokenizer.encode(&text)`; a stale cache is a correctness bug. The
/// reducer fills the cache for any chunk that arrives without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk<M> {
    /// Text content
    pub text: String,
    /// Format-specific metadata; the reducer never inspects this
    pub metadata: M,
    /// Cached token ids of `text`, if already computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded: Option<Vec<Token>>,
}

impl<M> Chunk<M> {
    /// Create a chunk without a token cache
    pub fn new(text: impl Into<String>, metadata: M) -> Self {
        Self {
            text: text.into(),
            metadata,
            encoded: None,
        }
    }

    /// Create a chunk with a precomputed token cache
    pub fn with_encoding(text: impl Into<String>, metadata: M, encoded: Vec<Token>) -> Self {
        Self {
            text: text.into(),
            metadata,
            encoded: Some(encoded),
        }
    }

    /// Cached token count, if the chunk has been tokenized
    pub fn token_count(&self) -> Option<usize> {
        self.encoded.as_ref().map(Vec::len)
    }

    /// Replace the metadata, keeping text and cache
    pub fn map_metadata<N>(self, f: impl FnOnce(M) -> N) -> Chunk<N> {
        Chunk {
            text: self.text,
            metadata: f(self.metadata),
            encoded: self.encoded,
        }
    }
}
