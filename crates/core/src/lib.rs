//! lexbpe-core - Vocabulary and segmentation primitives
//!
//! This crate provides the data structures shared by training and encoding:
//! symbols, vocabulary entries, the merge log, the indexed merge heap, and the
//! [`Encoder`] that segments words into the fewest vocabulary pieces.
//!
//! # Features
//!
//! - Character-mode and byte-mode symbols behind one [`Symbol`] type
//! - Vocabulary files in the `{BytePair, BytePairBytes, Count}` JSON layout
//! - Indexed max-heap with in-place count updates for greedy merging
//! - Minimal-piece segmentation with a deterministic tie-break
//!
//! # Example
//!
//! ```rust
//! use lexbpe_core::{Encoder, Entry, SymbolMode};
//!
//! let entries = ["ab", "a", "b"].iter().map(|s| Entry::new(*s, 0)).collect();
//! let encoder = Encoder::from_vocab(entries, SymbolMode::Chars);
//!
//! let pieces = encoder.encode("abab").unwrap();
//! assert_eq!(pieces, ["ab", "ab"]);
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Vocabulary and merge bookkeeping
pub mod core;
pub use self::core::{
    sort_entries, Entry, MergeCandidate, MergeHeap, MergedPair, Pair, Symbol, SymbolMode,
    Vocabulary,
};

// Segmentation
pub mod encoding;
pub use encoding::{Encoder, FAST_PATH_MAX_PIECES};

// Vocabulary and word-count files
pub mod io;
pub use io::{SerializedEntry, VocabLoader, VocabSaver, WordCount};
