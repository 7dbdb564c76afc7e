//! Vocabulary storage and lookup.
//!
//! A [`Vocabulary`] is an ordered, deduplicated list of [`Entry`] values with a
//! derived symbol -> index map. Indices are positions in the list, so the
//! order entries are supplied in is the order downstream IDs are assigned in.

use super::symbol::{Symbol, SymbolMode};
use ahash::AHashMap;
use std::cmp::Ordering;

/// One vocabulary symbol with its aggregate frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The symbol
    pub symbol: Symbol,
    /// Total occurrences of the symbol across the training words
    pub count: u64,
}

impl Entry {
    /// Create a new entry.
    pub fn new(symbol: impl Into<Symbol>, count: u64) -> Self {
        Self {
            symbol: symbol.into(),
            count,
        }
    }
}

/// Serialization order: longer symbols first, then lexicographically greater
/// symbols first. Longest-match consumers rely on this order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| serialization_order(&a.symbol, &b.symbol));
}

fn serialization_order(a: &Symbol, b: &Symbol) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| b.cmp(a))
}

/// Ordered vocabulary with a symbol -> index map.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// Entries in index order
    entries: Vec<Entry>,
    /// Forward mapping: symbol -> index
    index: AHashMap<Symbol, u32>,
    /// How words are split into base units
    mode: SymbolMode,
    /// Length of the longest entry, in base units
    max_units: usize,
}

impl Vocabulary {
    /// Build a vocabulary keeping the supplied order.
    ///
    /// Duplicate symbols keep their first position.
    pub fn new(entries: impl IntoIterator<Item = Entry>, mode: SymbolMode) -> Self {
        let entries = entries.into_iter();
        let mut vocab = Self {
            entries: Vec::with_capacity(entries.size_hint().0),
            index: AHashMap::with_capacity(entries.size_hint().0),
            mode,
            max_units: 0,
        };

        for entry in entries {
            if vocab.index.contains_key(&entry.symbol) {
                continue;
            }
            let id = vocab.entries.len() as u32;
            vocab.max_units = vocab
                .max_units
                .max(mode.unit_count(entry.symbol.as_bytes()));
            vocab.index.insert(entry.symbol.clone(), id);
            vocab.entries.push(entry);
        }

        vocab
    }

    /// Get the index of a symbol.
    #[inline]
    pub fn get_id(&self, symbol: &[u8]) -> Option<u32> {
        self.index.get(symbol).copied()
    }

    /// Check whether a symbol is in the vocabulary.
    #[inline]
    pub fn contains(&self, symbol: &[u8]) -> bool {
        self.index.contains_key(symbol)
    }

    /// Get the symbol stored at an index.
    #[inline]
    pub fn get_symbol(&self, id: u32) -> Option<&Symbol> {
        self.entries.get(id as usize).map(|e| &e.symbol)
    }

    /// Entries in index order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Symbols in index order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.entries.iter().map(|e| &e.symbol)
    }

    /// The symbol -> index map.
    pub fn index(&self) -> &AHashMap<Symbol, u32> {
        &self.index
    }

    /// How words are split into base units.
    #[inline]
    pub fn mode(&self) -> SymbolMode {
        self.mode
    }

    /// Length of the longest entry, in base units.
    #[inline]
    pub fn max_units(&self) -> usize {
        self.max_units
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_order() {
        let vocab = Vocabulary::new(
            vec![Entry::new("hello", 3), Entry::new("world", 1)],
            SymbolMode::Chars,
        );

        assert_eq!(vocab.get_id(b"hello"), Some(0));
        assert_eq!(vocab.get_id(b"world"), Some(1));
        assert_eq!(vocab.get_symbol(1).unwrap(), "world");
        assert_eq!(vocab.get_id(b"missing"), None);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let vocab = Vocabulary::new(
            vec![Entry::new("a", 1), Entry::new("b", 2), Entry::new("a", 5)],
            SymbolMode::Chars,
        );

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.entries()[0].count, 1);
    }

    #[test]
    fn test_serialization_order() {
        let mut entries = vec![
            Entry::new("b", 0),
            Entry::new("ab", 0),
            Entry::new("abc", 0),
            Entry::new("a", 0),
            Entry::new("ba", 0),
        ];
        sort_entries(&mut entries);

        let order: Vec<_> = entries.iter().map(|e| e.symbol.clone()).collect();
        assert_eq!(order, ["abc", "ba", "ab", "b", "a"]);
    }

    #[test]
    fn test_max_units_counts_chars() {
        let vocab = Vocabulary::new(
            vec![Entry::new("⌘⌘", 0), Entry::new("abc", 0)],
            SymbolMode::Chars,
        );
        assert_eq!(vocab.max_units(), 3);

        let vocab = Vocabulary::new(vec![Entry::new("⌘⌘", 0)], SymbolMode::Bytes);
        assert_eq!(vocab.max_units(), 6);
    }
}
