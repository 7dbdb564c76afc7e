//! Minimal-piece segmentation of words into vocabulary entries.
//!
//! Among all segmentations with the fewest pieces, the encoder returns the one
//! whose first piece is shortest, then whose second piece is shortest, and so
//! on. The fast path and the dynamic program both produce exactly this
//! segmentation, so the fast path is purely an optimization.

use crate::core::{Entry, Symbol, SymbolMode, Vocabulary};
use crate::io::VocabLoader;
use crate::Result;
use ahash::AHashMap;
use std::path::Path;
use std::sync::Arc;

/// Largest piece count the depth-first fast path searches for.
pub const FAST_PATH_MAX_PIECES: usize = 4;

const UNREACHABLE: u32 = u32::MAX;

/// Segments words into vocabulary pieces.
///
/// The encoder never mutates its vocabulary, so one instance (or many
/// instances sharing one `Arc<Vocabulary>`) can be used from any number of
/// threads.
#[derive(Debug, Clone)]
pub struct Encoder {
    vocab: Arc<Vocabulary>,
}

impl Encoder {
    /// Load an encoder from a vocabulary file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let vocab = VocabLoader::load(path)?;
        Ok(Self::from_vocabulary(Arc::new(vocab)))
    }

    /// Build an encoder from entries, keeping their order as index order.
    pub fn from_vocab(entries: Vec<Entry>, mode: SymbolMode) -> Self {
        Self::from_vocabulary(Arc::new(Vocabulary::new(entries, mode)))
    }

    /// Build an encoder over a shared vocabulary.
    pub fn from_vocabulary(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// Segment `word` into the fewest vocabulary pieces.
    ///
    /// Returns `None` if some base unit of `word` is not in the vocabulary.
    pub fn encode(&self, word: impl AsRef<[u8]>) -> Option<Vec<Symbol>> {
        let word = word.as_ref();
        let spans = self.segment(word)?;
        Some(
            spans
                .into_iter()
                .map(|(start, end)| Symbol::from(&word[start..end]))
                .collect(),
        )
    }

    /// Segment `word` and map every piece to its vocabulary index.
    pub fn encode_idx(&self, word: impl AsRef<[u8]>) -> Option<Vec<u32>> {
        let word = word.as_ref();
        let spans = self.segment(word)?;
        spans
            .into_iter()
            .map(|(start, end)| self.vocab.get_id(&word[start..end]))
            .collect()
    }

    /// Encode several words and concatenate their pieces.
    ///
    /// Words that cannot be represented contribute nothing.
    pub fn encode_all<I, W>(&self, words: I) -> Vec<Symbol>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[u8]>,
    {
        words
            .into_iter()
            .filter_map(|w| self.encode(w))
            .flatten()
            .collect()
    }

    /// Index of a symbol, if it is a vocabulary entry.
    #[inline]
    pub fn entry(&self, symbol: impl AsRef<[u8]>) -> Option<u32> {
        self.vocab.get_id(symbol.as_ref())
    }

    /// The symbol -> index map.
    pub fn vocab_map(&self) -> &AHashMap<Symbol, u32> {
        self.vocab.index()
    }

    /// Vocabulary symbols in index order.
    pub fn vocab(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.vocab.symbols()
    }

    /// The shared vocabulary.
    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Number of vocabulary entries.
    #[inline]
    pub fn size(&self) -> usize {
        self.vocab.len()
    }

    /// How words are split into base units.
    #[inline]
    pub fn mode(&self) -> SymbolMode {
        self.vocab.mode()
    }

    /// Length of the longest vocabulary entry, in base units.
    #[inline]
    pub fn max_units(&self) -> usize {
        self.vocab.max_units()
    }

    /// Byte spans of the minimal segmentation of `word`.
    fn segment(&self, word: &[u8]) -> Option<Vec<(usize, usize)>> {
        let bounds = self.vocab.mode().unit_boundaries(word);
        let units = bounds.len() - 1;
        if units == 0 {
            return Some(Vec::new());
        }

        if bounds
            .windows(2)
            .any(|w| !self.vocab.contains(&word[w[0]..w[1]]))
        {
            return None;
        }

        self.segment_fast(word, &bounds)
            .or_else(|| self.segment_dp(word, &bounds))
    }

    /// Iterative deepening over piece counts, shortest prefix first.
    ///
    /// The first hit at depth `d` is the minimal segmentation with the
    /// shortest leading pieces, which is also what the dynamic program picks.
    pub(crate) fn segment_fast(&self, word: &[u8], bounds: &[usize]) -> Option<Vec<(usize, usize)>> {
        let units = bounds.len() - 1;
        let max_units = self.vocab.max_units().max(1);
        let mut pieces = Vec::with_capacity(FAST_PATH_MAX_PIECES);

        for depth in 1..=FAST_PATH_MAX_PIECES {
            if units > depth * max_units {
                continue;
            }
            if self.search(word, bounds, 0, depth, max_units, &mut pieces) {
                return Some(
                    pieces
                        .iter()
                        .map(|&(start, end)| (bounds[start], bounds[end]))
                        .collect(),
                );
            }
        }

        None
    }

    fn search(
        &self,
        word: &[u8],
        bounds: &[usize],
        start: usize,
        depth: usize,
        max_units: usize,
        pieces: &mut Vec<(usize, usize)>,
    ) -> bool {
        let units = bounds.len() - 1;
        if start == units {
            return true;
        }
        let remaining = units - start;
        if depth == 0 || remaining > depth * max_units {
            return false;
        }

        for len in 1..=remaining.min(max_units) {
            let end = start + len;
            if !self.vocab.contains(&word[bounds[start]..bounds[end]]) {
                continue;
            }
            pieces.push((start, end));
            if self.search(word, bounds, end, depth - 1, max_units, pieces) {
                return true;
            }
            pieces.pop();
        }

        false
    }

    /// Minimal-piece segmentation by a suffix dynamic program.
    ///
    /// `cost[i]` is the fewest pieces covering units `[i, units)` and `next[i]`
    /// the end of the first piece achieving it. Shorter first pieces win ties.
    /// Runs in O(units * max_units) time and O(units) memory.
    pub(crate) fn segment_dp(&self, word: &[u8], bounds: &[usize]) -> Option<Vec<(usize, usize)>> {
        let units = bounds.len() - 1;
        let max_units = self.vocab.max_units().max(1);
        let mut cost = vec![UNREACHABLE; units + 1];
        let mut next = vec![0usize; units + 1];
        cost[units] = 0;

        for i in (0..units).rev() {
            for len in 1..=max_units.min(units - i) {
                let end = i + len;
                if cost[end] == UNREACHABLE || !self.vocab.contains(&word[bounds[i]..bounds[end]]) {
                    continue;
                }
                if cost[end] + 1 < cost[i] {
                    cost[i] = cost[end] + 1;
                    next[i] = end;
                }
            }
        }

        if cost[0] == UNREACHABLE {
            return None;
        }

        let mut spans = Vec::with_capacity(cost[0] as usize);
        let mut start = 0;
        while start < units {
            let end = next[start];
            spans.push((bounds[start], bounds[end]));
            start = end;
        }

        Some(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(symbols: &[&str]) -> Encoder {
        let entries = symbols.iter().map(|s| Entry::new(*s, 0)).collect();
        Encoder::from_vocab(entries, SymbolMode::Chars)
    }

    #[test]
    fn test_dp_picks_first_minimal_split() {
        let enc = encoder(&[
            "a", "b", "c", "d", "e", "f", "g", "h", "$", "ac", "ce", "eg", "gh", "hf", "fd", "db",
            "b$",
        ]);

        let pieces = enc.encode("aceghfdb$").unwrap();
        assert_eq!(pieces, ["a", "ce", "gh", "fd", "b$"]);
    }

    #[test]
    fn test_single_unit() {
        let enc = encoder(&["a", "b", "ab"]);

        assert_eq!(enc.encode("a").unwrap(), ["a"]);
        assert_eq!(enc.encode_idx("b").unwrap(), vec![1]);
    }

    #[test]
    fn test_unknown_unit_fails() {
        let enc = encoder(&["a", "b", "ab"]);

        assert!(enc.encode("abz").is_none());
        assert!(enc.encode_idx("z").is_none());
    }

    #[test]
    fn test_empty_word() {
        let enc = encoder(&["a"]);
        assert_eq!(enc.encode("").unwrap(), Vec::<Symbol>::new());
    }

    #[test]
    fn test_encode_idx_uses_vocab_order() {
        let enc = encoder(&["abc", "ab", "c", "b", "a"]);

        assert_eq!(enc.encode_idx("abcab").unwrap(), vec![0, 1]);
        assert_eq!(enc.entry("c"), Some(2));
        assert_eq!(enc.size(), 5);
        assert_eq!(enc.vocab_map().len(), 5);
    }

    #[test]
    fn test_multibyte_units() {
        let enc = encoder(&["f", "o", "⌘", "⌘o", "fo⌘o"]);

        assert_eq!(enc.encode("fo⌘o").unwrap(), ["fo⌘o"]);
        assert_eq!(enc.encode("o⌘o").unwrap(), ["o", "⌘o"]);
    }

    #[test]
    fn test_byte_mode() {
        let bytes = "⌘".as_bytes();
        let mut entries: Vec<Entry> = bytes.iter().map(|b| Entry::new(vec![*b], 0)).collect();
        entries.push(Entry::new(bytes[..2].to_vec(), 0));
        let enc = Encoder::from_vocab(entries, SymbolMode::Bytes);

        let pieces = enc.encode(bytes).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].as_bytes(), &bytes[..2]);
    }

    #[test]
    fn test_encode_all_skips_unrepresentable() {
        let enc = encoder(&["a", "b", "ab"]);

        let pieces = enc.encode_all(["ab", "zz", "ba"]);
        assert_eq!(pieces, ["ab", "b", "a"]);
    }

    #[test]
    fn test_fast_path_matches_dp() {
        let enc = encoder(&[
            "a", "b", "c", "ab", "bc", "abc", "ca", "cab", "bca", "aa", "ba",
        ]);
        let alphabet = ['a', 'b', 'c'];

        // Every word over the alphabet up to length 7
        let mut words = Vec::new();
        let mut frontier = vec![String::new()];
        for _ in 0..7 {
            frontier = frontier
                .iter()
                .flat_map(|w| alphabet.iter().map(move |c| format!("{}{}", w, c)))
                .collect();
            words.extend(frontier.iter().cloned());
        }

        for word in &words {
            let bounds = enc.mode().unit_boundaries(word.as_bytes());
            let dp = enc.segment_dp(word.as_bytes(), &bounds).unwrap();
            if let Some(fast) = enc.segment_fast(word.as_bytes(), &bounds) {
                assert_eq!(fast, dp, "word {}", word);
            } else {
                assert!(dp.len() > FAST_PATH_MAX_PIECES, "word {}", word);
            }
        }
    }

    #[test]
    fn test_long_word_falls_back_to_dp() {
        let enc = encoder(&["a", "b", "ab"]);
        let word = "ab".repeat(5000);

        let pieces = enc.encode(&word).unwrap();
        assert_eq!(pieces.len(), 5000);
        assert!(pieces.iter().all(|p| p == "ab"));

        let word = format!("{}a", word);
        let pieces = enc.encode(&word).unwrap();
        assert_eq!(pieces.len(), 5001);
        assert_eq!(pieces[5000], "a");
    }

    #[test]
    fn test_shared_across_threads() {
        let enc = encoder(&["a", "b", "ab", "ba"]);

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!(enc.encode("abab").unwrap(), ["ab", "ab"]);
                    }
                });
            }
        });
    }
}
