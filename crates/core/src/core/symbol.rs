//! Vocabulary symbols and base-unit splitting.
//!
//! A [`Symbol`] is an owned byte string. In character mode every symbol is a
//! concatenation of Unicode scalar values; in byte mode a symbol may hold any
//! bytes. Comparisons are always over the raw bytes.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// A vocabulary symbol (one or more base units).
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Vec<u8>);

impl Symbol {
    /// Create a symbol from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Concatenate two symbols into a new one.
    pub fn join(&self, other: &Symbol) -> Symbol {
        let mut bytes = Vec::with_capacity(self.0.len() + other.0.len());
        bytes.extend_from_slice(&self.0);
        bytes.extend_from_slice(&other.0);
        Symbol(bytes)
    }

    /// Raw bytes of the symbol.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The symbol as UTF-8, if it is valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// The symbol as text, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the symbol is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the symbol, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Borrow<[u8]> for Symbol {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Symbol {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&[u8]> for Symbol {
    fn from(b: &[u8]) -> Self {
        Self(b.to_vec())
    }
}

impl From<Vec<u8>> for Symbol {
    fn from(b: Vec<u8>) -> Self {
        Self(b)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{:?}", s),
            None => write!(f, "{:x?}", self.0),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// How words are split into base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymbolMode {
    /// One unit per Unicode scalar value. Bytes that are not valid UTF-8
    /// become single-byte units.
    #[default]
    Chars,
    /// One unit per byte.
    Bytes,
}

impl SymbolMode {
    /// Byte offsets of every unit boundary in `word`, including `0` and
    /// `word.len()`.
    pub fn unit_boundaries(self, word: &[u8]) -> Vec<usize> {
        let mut bounds = Vec::with_capacity(word.len() + 1);
        match self {
            SymbolMode::Bytes => bounds.extend(0..=word.len()),
            SymbolMode::Chars => {
                let mut offset = 0;
                for chunk in word.utf8_chunks() {
                    for (i, _) in chunk.valid().char_indices() {
                        bounds.push(offset + i);
                    }
                    offset += chunk.valid().len();
                    for _ in chunk.invalid() {
                        bounds.push(offset);
                        offset += 1;
                    }
                }
                bounds.push(word.len());
            }
        }
        bounds
    }

    /// Number of base units in `word`.
    pub fn unit_count(self, word: &[u8]) -> usize {
        match self {
            SymbolMode::Bytes => word.len(),
            SymbolMode::Chars => word
                .utf8_chunks()
                .map(|chunk| chunk.valid().chars().count() + chunk.invalid().len())
                .sum(),
        }
    }

    /// Split `word` into one symbol per base unit.
    pub fn split(self, word: &[u8]) -> Vec<Symbol> {
        self.unit_boundaries(word)
            .windows(2)
            .map(|w| Symbol::from(&word[w[0]..w[1]]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chars() {
        let units = SymbolMode::Chars.split("fo⌘o".as_bytes());
        assert_eq!(units, ["f", "o", "⌘", "o"]);
    }

    #[test]
    fn test_split_bytes() {
        let units = SymbolMode::Bytes.split("a⌘".as_bytes());
        assert_eq!(units.len(), 4);
        assert_eq!(units[0], "a");
        assert_eq!(units[1].as_bytes(), &[0xe2]);
    }

    #[test]
    fn test_invalid_utf8_units() {
        let word = [b'a', 0xff, b'b'];
        assert_eq!(SymbolMode::Chars.unit_boundaries(&word), vec![0, 1, 2, 3]);
        assert_eq!(SymbolMode::Chars.unit_count(&word), 3);
    }

    #[test]
    fn test_empty_word() {
        assert_eq!(SymbolMode::Chars.unit_boundaries(b""), vec![0]);
        assert!(SymbolMode::Bytes.split(b"").is_empty());
    }

    #[test]
    fn test_byte_order() {
        // Raw byte comparison: 0xE2 sorts after 'o'
        assert!(Symbol::from("⌘o") > Symbol::from("o⌘o"));
        assert_eq!(Symbol::from("ab").join(&Symbol::from("c")), "abc");
    }
}
