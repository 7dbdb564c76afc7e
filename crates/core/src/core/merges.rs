//! Merge records produced during training.
//!
//! Training works on interned symbol IDs, so a [`Pair`] is two IDs. The
//! merge log keeps the symbols themselves so it stays meaningful once the
//! builder that assigned the IDs is gone.

use super::symbol::Symbol;

/// A pair of interned symbol IDs that can be merged.
pub type Pair = (u32, u32);

/// Two parent symbols and the symbol produced by joining them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergedPair {
    /// Left parent
    pub parent1: Symbol,
    /// Right parent
    pub parent2: Symbol,
    /// `parent1` followed by `parent2`
    pub joined: Symbol,
}

impl MergedPair {
    /// Create a merged pair from its parents.
    pub fn new(parent1: Symbol, parent2: Symbol) -> Self {
        let joined = parent1.join(&parent2);
        Self {
            parent1,
            parent2,
            joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined() {
        let pair = MergedPair::new(Symbol::from("fo"), Symbol::from("⌘o"));
        assert_eq!(pair.joined, "fo⌘o");
        assert_eq!(pair.parent1, "fo");
        assert_eq!(pair.parent2, "⌘o");
    }
}
