//! lexbpe-training - BPE vocabulary learning
//!
//! This crate learns a subword vocabulary from word counts by repeatedly
//! merging the most frequent adjacent symbol pair.
//!
//! # Features
//!
//! - Character-mode or byte-mode base units, or bootstrapping from an
//!   existing [`lexbpe_core::Encoder`]
//! - Indexed max-heap with in-place count updates
//! - Parallel per-word merge application with a single delta aggregator
//! - Deterministic results regardless of worker count
//! - Word-count cutoffs, abort flag and periodic checkpoints
//!
//! # Example
//!
//! ```rust
//! use lexbpe_core::SymbolMode;
//! use lexbpe_training::{MergeOptions, VocabBuilder};
//!
//! let mut builder = VocabBuilder::new(SymbolMode::Chars);
//! builder.add_words(["low", "low", "lower", "lowest"]);
//!
//! let opts = MergeOptions::builder().concurrency(2).build().unwrap();
//! builder.merge(&opts).unwrap();
//!
//! let joined: Vec<_> = builder.merge_log().iter().map(|m| m.joined.to_string()).collect();
//! assert_eq!(joined[..2], ["ow", "low"]);
//! ```

pub use lexbpe_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{
    LoadOptions, MergeOptions, MergeOptionsBuilder, PairCounter, StopReason, TokenizedWord,
    VocabBuilder,
};
