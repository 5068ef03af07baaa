//! Tokenizer adapter over tiktoken BPE encodings
//!
//! Budgets everywhere in this workspace are expressed in the configured
//! tokenizer's units. Encoder construction is expensive, so resolved
//! encodings are cached process-wide per model name; the `Tokenizer` handle
//! itself is cheap to clone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

use crate::chunk::Token;
use crate::error::{Error, Result};

/// Default budget unit: a GPT-4o-class (o200k) encoding
pub const DEFAULT_TOKENIZER_MODEL: &str = "gpt-4o";

static ENCODERS: Lazy<Mutex<HashMap<String, Arc<CoreBPE>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A tokenizer keyed by model identifier
#[derive(Clone)]
pub struct Tokenizer {
    model: String,
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("model", &self.model)
            .finish()
    }
}

impl Tokenizer {
    /// Resolve a tokenizer for the given model name
    pub fn for_model(model: &str) -> Result<Self> {
        let mut cache = ENCODERS.lock().expect("encoder cache poisoned");
        if let Some(bpe) = cache.get(model) {
            return Ok(Self {
                model: model.to_string(),
                bpe: Arc::clone(bpe),
            });
        }

        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| Error::unknown_model(model, e.to_string()))?;
        let bpe = Arc::new(bpe);
        cache.insert(model.to_string(), Arc::clone(&bpe));
        tracing::debug!("Loaded tokenizer encoding for model '{}'", model);

        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    /// The default GPT-4o-class tokenizer
    pub fn default_model() -> Result<Self> {
        Self::for_model(DEFAULT_TOKENIZER_MODEL)
    }

    /// Model name this tokenizer was resolved for
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Encode text to token ids
    pub fn encode(&self, text: &str) -> Vec<Token> {
        self.bpe.encode_with_special_tokens(text)
    }

    /// Count tokens in text
    pub fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    /// Decode token ids back to text
    ///
    /// Fails when the sequence does not decode to valid UTF-8, which can
    /// happen for slices cut inside a multi-byte character.
    pub fn decode(&self, tokens: &[Token]) -> Result<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| Error::decode(e.to_string()))
    }
}
