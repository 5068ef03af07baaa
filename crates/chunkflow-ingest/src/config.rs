//! Chunking configuration

use serde::{Deserialize, Serialize};

use chunkflow_core::{ReduceOptions, DEFAULT_TOKENIZER_MODEL};

use crate::extract::text::SplitOptions;

/// Chunking configuration
///
/// Deserializable so callers can load it from their config files; converts
/// into the operational option structs consumed by the splitter and reducer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Model identifier the token budget is expressed in
    #[serde(default = "default_tokenizer_model")]
    pub tokenizer_model: String,
    /// Target tokens per chunk (default: 256)
    #[serde(default = "default_target_chunk_size")]
    pub target_chunk_size: usize,
    /// Token overlap between adjacent plain-text chunks (default: 20)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_tokenizer_model() -> String {
    DEFAULT_TOKENIZER_MODEL.to_string()
}

fn default_target_chunk_size() -> usize {
    256
}

fn default_chunk_overlap() -> usize {
    20
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            tokenizer_model: default_tokenizer_model(),
            target_chunk_size: default_target_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl ChunkingConfig {
    /// Options for a reduction run under this configuration
    pub fn reduce_options(&self) -> ReduceOptions {
        ReduceOptions {
            tokenizer_model: self.tokenizer_model.clone(),
            target_chunk_size: self.target_chunk_size,
        }
    }

    /// Options for a plain-text split under this configuration
    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            chunk_size: self.target_chunk_size,
            chunk_overlap: self.chunk_overlap,
            tokenizer_model: self.tokenizer_model.clone(),
        }
    }
}
