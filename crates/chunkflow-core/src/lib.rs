//! chunkflow-core: token-aware chunk model and streaming chunk reducer
//!
//! This crate provides the format-agnostic primitives of the chunkflow
//! pipeline: a tokenizer adapter keyed by model name, the generic `Chunk<M>`
//! unit, and a lazy single-accumulator reducer that merges an ordered chunk
//! stream under a token budget using a pluggable combine strategy. Format
//! knowledge (what may merge with what, and how) lives entirely in strategy
//! implementations supplied by callers.

pub mod chunk;
pub mod error;
pub mod reduce;
pub mod tokenizer;

pub use chunk::{Chunk, Token};
pub use error::{Error, Result};
pub use reduce::{reduce, reduce_to_vec, CombineContext, CombineStrategy, Reduce, ReduceOptions};
pub use tokenizer::{Tokenizer, DEFAULT_TOKENIZER_MODEL};
