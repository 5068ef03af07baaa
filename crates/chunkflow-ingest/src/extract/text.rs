//! Plain-text sliding-window splitting
//!
//! A deterministic partition of the token stream: windows of `chunk_size`
//! tokens advancing by `chunk_size - chunk_overlap` (minimum 1). The total
//! chunk count is only known once splitting completes, so metadata is
//! backfilled in a second pass.

use chunkflow_core::{Chunk, Tokenizer, DEFAULT_TOKENIZER_MODEL};

use crate::error::Result;
use crate::types::TextMeta;

/// Options for one plain-text split
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Window width in tokens (default: 256)
    pub chunk_size: usize,
    /// Token overlap between adjacent windows (default: 20)
    pub chunk_overlap: usize,
    /// Model identifier the window sizes are expressed in
    pub tokenizer_model: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            chunk_overlap: 20,
            tokenizer_model: DEFAULT_TOKENIZER_MODEL.to_string(),
        }
    }
}

/// Split text into overlapping token windows
pub fn split_text(text: &str, options: &SplitOptions) -> Result<Vec<Chunk<TextMeta>>> {
    let tokenizer = Tokenizer::for_model(&options.tokenizer_model)?;
    let chunk_size = options.chunk_size.max(1);
    let ids = tokenizer.encode(text);

    if ids.len() <= chunk_size {
        return Ok(vec![Chunk::with_encoding(
            text,
            TextMeta {
                chunk_index: 0,
                total_chunks: 1,
            },
            ids,
        )]);
    }

    let step = chunk_size.saturating_sub(options.chunk_overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(ids.len());
        windows.push(&ids[start..end]);
        if end == ids.len() {
            break;
        }
        start += step;
    }

    tracing::debug!(
        "Split {} tokens into {} windows (size {}, overlap {})",
        ids.len(),
        windows.len(),
        chunk_size,
        options.chunk_overlap
    );

    let total_chunks = windows.len();
    windows
        .into_iter()
        .enumerate()
        .map(|(chunk_index, window)| {
            let text = tokenizer.decode(window)?;
            Ok(Chunk::with_encoding(
                text,
                TextMeta {
                    chunk_index,
                    total_chunks,
                },
                window.to_vec(),
            ))
        })
        .collect()
}
