//! Vocabulary and word-count files.
//!
//! Both files are JSON arrays. Vocabulary entries carry either a string or a
//! base64 byte field depending on the symbol mode; word counts always carry
//! base64 bytes.

pub mod format;
pub mod load;
pub mod save;

pub use format::{SerializedEntry, WordCount};
pub use load::VocabLoader;
pub use save::VocabSaver;
