//! Streaming chunk reduction under a token budget
//!
//! The reducer is format-agnostic: it owns the accumulator/budget loop and
//! delegates every merge decision to a `CombineStrategy`. Strategies see two
//! adjacent chunks and return what should flow on; the reducer holds at most
//! one accumulator chunk regardless of input size.

use std::collections::VecDeque;

use crate::chunk::Chunk;
use crate::error::Result;
use crate::tokenizer::{Tokenizer, DEFAULT_TOKENIZER_MODEL};

/// Options for one reduction run
#[derive(Debug, Clone)]
pub struct ReduceOptions {
    /// Model identifier the token budget is expressed in
    pub tokenizer_model: String,
    /// Maximum tokens permitted in one emitted chunk, where the strategy allows
    pub target_chunk_size: usize,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            tokenizer_model: DEFAULT_TOKENIZER_MODEL.to_string(),
            target_chunk_size: 256,
        }
    }
}

/// Immutable context lent to strategy calls for the duration of one run
pub struct CombineContext<'a> {
    /// Tokenizer the run's budget is expressed in
    pub tokenizer: &'a Tokenizer,
    /// Token budget per emitted chunk
    pub target_chunk_size: usize,
}

/// Per-format merge policy consumed by the reducer
///
/// Return-length semantics of `combine(first, second, ..)`:
/// - 0 chunks: drop the accumulator entirely
/// - 1 chunk: the two were merged; it becomes the accumulator
/// - 2 chunks: no merge; the first is emitted, the second becomes the accumulator
/// - 3+ chunks: all but the last are emitted, the last becomes the accumulator
pub trait CombineStrategy<M> {
    /// Decide what happens when `second` follows `first` within budget
    fn combine(
        &self,
        first: Chunk<M>,
        second: Chunk<M>,
        ctx: &CombineContext<'_>,
    ) -> Result<Vec<Chunk<M>>>;

    /// Flush remaining state at end of stream
    fn end(&self, last: Option<Chunk<M>>, ctx: &CombineContext<'_>) -> Result<Vec<Chunk<M>>> {
        let _ = ctx;
        Ok(last.into_iter().collect())
    }
}

/// Lazily reduce an ordered chunk stream with the given strategy
///
/// Every emitted chunk carries a token cache; chunks returned by the
/// strategy without one are tokenized before use.
pub fn reduce<M, I, S>(
    chunks: I,
    strategy: S,
    options: &ReduceOptions,
) -> Result<Reduce<I::IntoIter, S, M>>
where
    I: IntoIterator<Item = Chunk<M>>,
    S: CombineStrategy<M>,
{
    let tokenizer = Tokenizer::for_model(&options.tokenizer_model)?;
    Ok(Reduce {
        input: chunks.into_iter(),
        strategy,
        tokenizer,
        target_chunk_size: options.target_chunk_size,
        accumulator: None,
        pending: VecDeque::new(),
        finished: false,
    })
}

/// Eagerly reduce an ordered chunk stream into a vector
pub fn reduce_to_vec<M, I, S>(
    chunks: I,
    strategy: S,
    options: &ReduceOptions,
) -> Result<Vec<Chunk<M>>>
where
    I: IntoIterator<Item = Chunk<M>>,
    S: CombineStrategy<M>,
{
    reduce(chunks, strategy, options)?.collect()
}

/// Streaming reducer iterator
///
/// One instance must not be driven from multiple callers; independent runs
/// are safe in parallel since all state here is call-local.
pub struct Reduce<I, S, M>
where
    I: Iterator<Item = Chunk<M>>,
{
    input: I,
    strategy: S,
    tokenizer: Tokenizer,
    target_chunk_size: usize,
    accumulator: Option<Chunk<M>>,
    pending: VecDeque<Chunk<M>>,
    finished: bool,
}

impl<I, S, M> Reduce<I, S, M>
where
    I: Iterator<Item = Chunk<M>>,
{
    fn ensure_encoded(&self, mut chunk: Chunk<M>) -> Chunk<M> {
        if chunk.encoded.is_none() {
            chunk.encoded = Some(self.tokenizer.encode(&chunk.text));
        }
        chunk
    }

    fn fail(&mut self) {
        self.finished = true;
        self.accumulator = None;
        self.pending.clear();
    }
}

impl<I, S, M> Iterator for Reduce<I, S, M>
where
    I: Iterator<Item = Chunk<M>>,
    S: CombineStrategy<M>,
{
    type Item = Result<Chunk<M>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                return Some(Ok(self.ensure_encoded(chunk)));
            }
            if self.finished {
                return None;
            }

            match self.input.next() {
                None => {
                    self.finished = true;
                    let ctx = CombineContext {
                        tokenizer: &self.tokenizer,
                        target_chunk_size: self.target_chunk_size,
                    };
                    match self.strategy.end(self.accumulator.take(), &ctx) {
                        Ok(flushed) => self.pending.extend(flushed),
                        Err(e) => {
                            self.fail();
                            return Some(Err(e));
                        }
                    }
                }
                Some(incoming) => {
                    let incoming = self.ensure_encoded(incoming);
                    match self.accumulator.take() {
                        None => self.accumulator = Some(incoming),
                        Some(accumulator) => {
                            let held = accumulator.token_count().unwrap_or(0);
                            let added = incoming.token_count().unwrap_or(0);
                            if held + added <= self.target_chunk_size {
                                let ctx = CombineContext {
                                    tokenizer: &self.tokenizer,
                                    target_chunk_size: self.target_chunk_size,
                                };
                                let mut returned =
                                    match self.strategy.combine(accumulator, incoming, &ctx) {
                                        Ok(returned) => returned,
                                        Err(e) => {
                                            self.fail();
                                            return Some(Err(e));
                                        }
                                    };
                                // Last returned chunk is the new accumulator;
                                // everything before it is emitted as-is.
                                if let Some(last) = returned.pop() {
                                    self.accumulator = Some(self.ensure_encoded(last));
                                }
                                self.pending.extend(returned);
                            } else {
                                // Accumulator is full: emit it unchanged.
                                self.pending.push_back(accumulator);
                                self.accumulator = Some(incoming);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Merges within budget, refuses otherwise. Format-agnostic stand-in
    /// for the real per-format strategies.
    struct JoinStrategy;

    impl CombineStrategy<()> for JoinStrategy {
        fn combine(
            &self,
            first: Chunk<()>,
            second: Chunk<()>,
            ctx: &CombineContext<'_>,
        ) -> Result<Vec<Chunk<()>>> {
            let merged_text = format!("{} {}", first.text, second.text);
            let merged = ctx.tokenizer.encode(&merged_text);
            if merged.len() <= ctx.target_chunk_size {
                Ok(vec![Chunk::with_encoding(merged_text, (), merged)])
            } else {
                Ok(vec![first, second])
            }
        }
    }

    /// Never merges anything.
    struct RefuseAll;

    impl CombineStrategy<()> for RefuseAll {
        fn combine(
            &self,
            first: Chunk<()>,
            second: Chunk<()>,
            _ctx: &CombineContext<'_>,
        ) -> Result<Vec<Chunk<()>>> {
            Ok(vec![first, second])
        }
    }

    /// Drops the accumulator whenever a new chunk arrives within budget.
    struct DropAccumulator;

    impl CombineStrategy<()> for DropAccumulator {
        fn combine(
            &self,
            _first: Chunk<()>,
            _second: Chunk<()>,
            _ctx: &CombineContext<'_>,
        ) -> Result<Vec<Chunk<()>>> {
            Ok(vec![])
        }
    }

    /// Returns three chunks without token caches to exercise the 3+ return
    /// semantics and reducer-side tokenization.
    struct Triple;

    impl CombineStrategy<()> for Triple {
        fn combine(
            &self,
            first: Chunk<()>,
            second: Chunk<()>,
            _ctx: &CombineContext<'_>,
        ) -> Result<Vec<Chunk<()>>> {
            Ok(vec![
                Chunk::new(first.text, ()),
                Chunk::new(format!("{}-head", second.text), ()),
                Chunk::new(format!("{}-tail", second.text), ()),
            ])
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk<()>> {
        texts.iter().map(|t| Chunk::new(*t, ())).collect()
    }

    fn texts(chunks: &[Chunk<()>]) -> Vec<String> {
        chunks.iter().map(|c| c.text.clone()).collect()
    }

    #[test]
    fn test_empty_input_empty_output() {
        let out = reduce_to_vec(chunks(&[]), JoinStrategy, &ReduceOptions::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_chunk_passes_through_tokenized() {
        let out = reduce_to_vec(
            chunks(&["just one chunk"]),
            RefuseAll,
            &ReduceOptions::default(),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "just one chunk");
        let tok = Tokenizer::default_model().unwrap();
        assert_eq!(out[0].encoded.as_deref().unwrap(), tok.encode("just one chunk"));
    }

    #[test]
    fn test_refuse_strategy_is_pass_through() {
        let input = chunks(&["alpha", "beta", "gamma", "delta"]);
        let out = reduce_to_vec(input, RefuseAll, &ReduceOptions::default()).unwrap();
        assert_eq!(
            texts(&out),
            vec!["alpha", "beta", "gamma", "delta"],
            "order and count must be preserved"
        );
        assert!(out.iter().all(|c| c.encoded.is_some()));
    }

    #[test]
    fn test_small_chunks_merge_into_one() {
        let input = chunks(&["alpha", "beta", "gamma"]);
        let out = reduce_to_vec(input, JoinStrategy, &ReduceOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "alpha beta gamma");
    }

    #[test]
    fn test_full_accumulator_is_emitted_unchanged() {
        let tok = Tokenizer::default_model().unwrap();
        let long = "word ".repeat(40);
        let target = tok.count(&long);
        let input = chunks(&[&long, &long, "tail"]);
        let options = ReduceOptions {
            target_chunk_size: target,
            ..Default::default()
        };
        let out = reduce_to_vec(input, JoinStrategy, &options).unwrap();
        // Neither long chunk fits together with anything else, so they pass
        // through; only the tail could have merged and it has no partner.
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].text, long);
        assert_eq!(out[1].text, long);
        assert_eq!(out[2].text, "tail");
    }

    #[test]
    fn test_drop_semantics_clear_the_accumulator() {
        let input = chunks(&["one", "two", "three"]);
        let out = reduce_to_vec(input, DropAccumulator, &ReduceOptions::default()).unwrap();
        // "one"+"two" -> dropped, "three" becomes the accumulator and is
        // flushed by the default end().
        assert_eq!(texts(&out), vec!["three"]);
    }

    #[test]
    fn test_multi_return_emits_all_but_last() {
        let input = chunks(&["a", "b"]);
        let out = reduce_to_vec(input, Triple, &ReduceOptions::default()).unwrap();
        assert_eq!(texts(&out), vec!["a", "b-head", "b-tail"]);
        assert!(
            out.iter().all(|c| c.encoded.is_some()),
            "reducer must tokenize strategy returns lacking a cache"
        );
    }

    #[test]
    fn test_lazy_iteration_yields_incrementally() {
        let input = chunks(&["alpha", "beta"]);
        let mut iter = reduce(input, RefuseAll, &ReduceOptions::default()).unwrap();
        assert_eq!(iter.next().unwrap().unwrap().text, "alpha");
        assert_eq!(iter.next().unwrap().unwrap().text, "beta");
        assert!(iter.next().is_none());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn budget_is_never_exceeded(words in proptest::collection::vec("[a-z]{1,8}", 0..12)) {
                let tok = Tokenizer::default_model().unwrap();
                let target = 16usize;
                let input: Vec<Chunk<()>> = words
                    .iter()
                    .filter(|w| tok.count(w) <= target)
                    .map(|w| Chunk::new(w.clone(), ()))
                    .collect();
                let options = ReduceOptions { target_chunk_size: target, ..Default::default() };
                let out = reduce_to_vec(input, JoinStrategy, &options).unwrap();
                for chunk in &out {
                    prop_assert!(chunk.token_count().unwrap() <= target);
                }
            }

            #[test]
            fn refuse_strategy_preserves_count(words in proptest::collection::vec("[a-z]{1,8}", 0..12)) {
                let input: Vec<Chunk<()>> = words.iter().map(|w| Chunk::new(w.clone(), ())).collect();
                let expected = input.len();
                let out = reduce_to_vec(input, RefuseAll, &ReduceOptions::default()).unwrap();
                prop_assert_eq!(out.len(), expected);
            }
        }
    }
}
