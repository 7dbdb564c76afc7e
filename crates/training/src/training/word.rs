//! Words being trained on and their current segmentation.
//!
//! During training every symbol is interned to a `u32`, so words and pairs
//! are plain integer sequences. The [`SymbolTable`] maps IDs back to symbols
//! for tie-breaking and for the finished vocabulary.

use ahash::AHashMap;
use lexbpe_core::{MergedPair, Pair, Symbol};

/// Interned symbols for one training run.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Symbols by ID
    symbols: Vec<Symbol>,
    /// Reverse mapping: symbol -> ID
    ids: AHashMap<Symbol, u32>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the ID of a symbol, assigning the next free ID if it is new.
    pub fn intern(&mut self, symbol: Symbol) -> u32 {
        if let Some(&id) = self.ids.get(&symbol) {
            return id;
        }
        let id = self.symbols.len() as u32;
        self.ids.insert(symbol.clone(), id);
        self.symbols.push(symbol);
        id
    }

    /// Get the symbol behind an ID.
    ///
    /// Panics if the ID was not produced by this table.
    #[inline]
    pub fn get(&self, id: u32) -> &Symbol {
        &self.symbols[id as usize]
    }

    /// Look up the ID of a symbol without interning it.
    #[inline]
    pub fn id(&self, symbol: &[u8]) -> Option<u32> {
        self.ids.get(symbol).copied()
    }

    /// The parents and joined symbol of an interned pair.
    pub fn merged(&self, pair: Pair) -> MergedPair {
        MergedPair::new(self.get(pair.0).clone(), self.get(pair.1).clone())
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A distinct training word with its occurrence count.
///
/// The segmentation always concatenates back to the original word.
#[derive(Debug, Clone)]
pub struct TokenizedWord {
    /// Current segmentation, as symbol IDs
    tokens: Vec<u32>,
    /// Adjacent pairs -> left positions in `tokens`, ascending
    pairs: AHashMap<Pair, Vec<usize>>,
    /// Occurrences of the word
    count: u64,
}

impl TokenizedWord {
    /// Create a word from its initial segmentation, with a count of zero.
    pub fn new(tokens: Vec<u32>) -> Self {
        let mut word = Self {
            tokens,
            pairs: AHashMap::new(),
            count: 0,
        };
        word.compute_pairs();
        word
    }

    /// Current segmentation.
    #[inline]
    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    /// Occurrences of the word.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Register more occurrences.
    pub fn incr(&mut self, count: u64) {
        self.count += count;
    }

    /// Check whether `pair` occurs in the current segmentation.
    #[inline]
    pub fn contains(&self, pair: Pair) -> bool {
        self.pairs.contains_key(&pair)
    }

    /// Every adjacent pair with its number of occurrences.
    pub fn pairs(&self) -> impl Iterator<Item = (Pair, usize)> + '_ {
        self.pairs.iter().map(|(&pair, locs)| (pair, locs.len()))
    }

    /// Replace every non-overlapping occurrence of `pair`, scanning left to
    /// right, with `joined`.
    ///
    /// Returns the change to each pair count weighted by the word count.
    /// Pairs whose count is unchanged are omitted.
    pub fn merge_pair(&mut self, pair: Pair, joined: u32) -> Vec<(Pair, i64)> {
        let Some(locs) = self.pairs.get(&pair) else {
            return Vec::new();
        };

        let mut merged = Vec::with_capacity(self.tokens.len());
        let mut next = 0;
        for &loc in locs {
            if loc < next {
                continue;
            }
            merged.extend_from_slice(&self.tokens[next..loc]);
            merged.push(joined);
            next = loc + 2;
        }
        merged.extend_from_slice(&self.tokens[next..]);

        let before = std::mem::take(&mut self.pairs);
        self.tokens = merged;
        self.compute_pairs();

        let weight = self.count as i64;
        let mut deltas: Vec<(Pair, i64)> = before
            .iter()
            .map(|(p, locs)| {
                let now = self.pairs.get(p).map_or(0, Vec::len);
                (*p, (now as i64 - locs.len() as i64) * weight)
            })
            .collect();
        deltas.extend(
            self.pairs
                .iter()
                .filter(|(p, _)| !before.contains_key(*p))
                .map(|(p, locs)| (*p, locs.len() as i64 * weight)),
        );
        deltas.retain(|&(_, delta)| delta != 0);
        deltas
    }

    fn compute_pairs(&mut self) {
        self.pairs.clear();
        for (i, w) in self.tokens.windows(2).enumerate() {
            self.pairs.entry((w[0], w[1])).or_default().push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(tokens: &[u32], count: u64) -> TokenizedWord {
        let mut w = TokenizedWord::new(tokens.to_vec());
        w.incr(count);
        w
    }

    fn delta_map(deltas: Vec<(Pair, i64)>) -> AHashMap<Pair, i64> {
        deltas.into_iter().collect()
    }

    #[test]
    fn test_intern() {
        let mut table = SymbolTable::new();
        let a = table.intern(Symbol::from("a"));
        let b = table.intern(Symbol::from("b"));

        assert_eq!(table.intern(Symbol::from("a")), a);
        assert_eq!(table.id(b"b"), Some(b));
        assert_eq!(table.merged((a, b)).joined, "ab");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_pairs() {
        let w = word(&[0, 1, 0, 1], 1);

        let pairs: AHashMap<Pair, usize> = w.pairs().collect();
        assert_eq!(pairs[&(0, 1)], 2);
        assert_eq!(pairs[&(1, 0)], 1);
        assert!(w.contains((1, 0)));
        assert!(!w.contains((1, 1)));
    }

    #[test]
    fn test_merge_coalesces_left_to_right() {
        // "oooo" with ("o", "o") -> "oo", "oo"
        let mut w = word(&[0, 0, 0, 0], 2);
        let deltas = delta_map(w.merge_pair((0, 0), 1));

        assert_eq!(w.tokens(), &[1, 1]);
        assert_eq!(deltas[&(0, 0)], -6);
        assert_eq!(deltas[&(1, 1)], 2);
        assert_eq!(deltas.len(), 2);
    }

    #[test]
    fn test_merge_odd_run() {
        // "ooo" -> "oo", "o"
        let mut w = word(&[0, 0, 0], 1);
        let deltas = delta_map(w.merge_pair((0, 0), 1));

        assert_eq!(w.tokens(), &[1, 0]);
        assert_eq!(deltas[&(0, 0)], -2);
        assert_eq!(deltas[&(1, 0)], 1);
    }

    #[test]
    fn test_merge_updates_neighbours() {
        // f o ⌘ o, merge (⌘, o)
        let mut w = word(&[0, 1, 2, 1], 3);
        let deltas = delta_map(w.merge_pair((2, 1), 3));

        assert_eq!(w.tokens(), &[0, 1, 3]);
        assert_eq!(deltas[&(2, 1)], -3);
        assert_eq!(deltas[&(1, 2)], -3);
        assert_eq!(deltas[&(1, 3)], 3);
        assert!(!deltas.contains_key(&(0, 1)));
    }

    #[test]
    fn test_merge_missing_pair() {
        let mut w = word(&[0, 1], 1);
        assert!(w.merge_pair((1, 0), 2).is_empty());
        assert_eq!(w.tokens(), &[0, 1]);
    }
}
