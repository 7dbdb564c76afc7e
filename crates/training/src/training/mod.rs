//! Vocabulary training.
//!
//! [`VocabBuilder`] drives the greedy merge loop over [`TokenizedWord`]s,
//! using [`PairCounter`] for the initial pair counts and writing optional
//! checkpoints.

pub mod builder;
pub mod checkpoint;
pub mod counter;
pub mod word;

pub use builder::{
    LoadOptions, MergeOptions, MergeOptionsBuilder, StopReason, VocabBuilder,
    DEFAULT_CHECKPOINT_INTERVAL,
};
pub use counter::PairCounter;
pub use word::{SymbolTable, TokenizedWord};
