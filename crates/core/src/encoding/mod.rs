//! Subword segmentation.
//!
//! The [`Encoder`] splits a word into the fewest vocabulary pieces that cover
//! it exactly:
//! - Fast path: bounded depth-first search for segmentations of up to
//!   [`FAST_PATH_MAX_PIECES`] pieces
//! - Full path: dynamic program over every substring of the word

pub mod encoder;

pub use encoder::{Encoder, FAST_PATH_MAX_PIECES};
