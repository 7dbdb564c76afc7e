//! Vocabulary and merge bookkeeping.
//!
//! This module contains the data structures shared by the vocabulary builder
//! and the encoder, independent of how words are lexed.

pub mod merges;
pub mod priority;
pub mod symbol;
pub mod vocab;

pub use merges::{MergedPair, Pair};
pub use priority::{MergeCandidate, MergeHeap};
pub use symbol::{Symbol, SymbolMode};
pub use vocab::{sort_entries, Entry, Vocabulary};
