//! Pair counting for BPE training.
//!
//! Counts are weighted by word frequency. The parallel count builds the
//! initial heap; the sequential count is the from-scratch reference used when
//! a bookkeeping check fails.

use super::word::TokenizedWord;
use ahash::AHashMap;
use lexbpe_core::Pair;
use rayon::prelude::*;

/// Counter for pair frequencies over a set of words.
pub struct PairCounter<'a> {
    words: &'a [TokenizedWord],
}

impl<'a> PairCounter<'a> {
    /// Create a counter over `words`.
    pub fn new(words: &'a [TokenizedWord]) -> Self {
        Self { words }
    }

    /// Count all pairs in parallel on the current rayon pool.
    pub fn count_pairs_parallel(&self) -> AHashMap<Pair, i64> {
        self.words
            .par_iter()
            .map(|word| {
                let mut pair_counts: AHashMap<Pair, i64> = AHashMap::new();
                Self::add_word(&mut pair_counts, word);
                pair_counts
            })
            .reduce(AHashMap::new, |mut acc, pair_counts| {
                for (pair, count) in pair_counts {
                    *acc.entry(pair).or_insert(0) += count;
                }
                acc
            })
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self) -> AHashMap<Pair, i64> {
        let mut pair_counts: AHashMap<Pair, i64> = AHashMap::new();
        for word in self.words {
            Self::add_word(&mut pair_counts, word);
        }
        pair_counts
    }

    fn add_word(pair_counts: &mut AHashMap<Pair, i64>, word: &TokenizedWord) {
        let weight = word.count() as i64;
        for (pair, occurrences) in word.pairs() {
            *pair_counts.entry(pair).or_insert(0) += occurrences as i64 * weight;
        }
    }
}
