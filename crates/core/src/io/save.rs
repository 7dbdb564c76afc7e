//! Saving vocabulary and word-count files.

use super::format::{SerializedEntry, WordCount};
use crate::core::{Entry, SymbolMode};
use crate::{Result, TokenizerError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Vocabulary saver - writes entries in the order given.
///
/// Callers that need the serialization order sort with
/// [`crate::sort_entries`] first.
pub struct VocabSaver<'a> {
    /// Entries to write
    entries: &'a [Entry],
    /// Which record field carries the symbol
    mode: SymbolMode,
}

impl<'a> VocabSaver<'a> {
    /// Create a new vocabulary saver.
    pub fn new(entries: &'a [Entry], mode: SymbolMode) -> Self {
        Self { entries, mode }
    }

    /// Write the vocabulary as pretty-printed JSON, returning the bytes written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<u64> {
        let records: Vec<SerializedEntry> = self
            .entries
            .iter()
            .map(|e| SerializedEntry::from_entry(e, self.mode))
            .collect();

        let buf = serde_json::to_vec_pretty(&records)?;
        writer
            .write_all(&buf)
            .map_err(|e| TokenizerError::Save(format!("Failed to write vocabulary: {}", e)))?;

        Ok(buf.len() as u64)
    }

    /// Write the vocabulary to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TokenizerError::io(path, e))?;

        let mut writer = BufWriter::new(file);
        let written = self.write_to(&mut writer)?;
        writer.flush().map_err(|e| TokenizerError::io(path, e))?;

        Ok(written)
    }

    /// Write a word-count file.
    pub fn save_word_counts<P: AsRef<Path>>(path: P, words: &[WordCount]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TokenizerError::io(path, e))?;

        let mut writer = BufWriter::new(file);
        let mut ser =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b" "));
        words.serialize(&mut ser)?;
        writer.flush().map_err(|e| TokenizerError::io(path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::VocabLoader;
    use crate::sort_entries;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.bpe");

        let mut entries = vec![Entry::new("a", 4), Entry::new("ab", 2), Entry::new("b", 2)];
        sort_entries(&mut entries);
        let written = VocabSaver::new(&entries, SymbolMode::Chars).save(&path).unwrap();
        assert_eq!(written, std::fs::metadata(&path).unwrap().len());

        let (loaded, mode) = VocabLoader::load_entries(&path).unwrap();
        assert_eq!(mode, SymbolMode::Chars);
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_pretty_printed() {
        let entries = vec![Entry::new("a", 1)];
        let mut buf = Vec::new();
        VocabSaver::new(&entries, SymbolMode::Chars)
            .write_to(&mut buf)
            .unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[\n  {\n    \"BytePair\": \"a\""));
    }

    #[test]
    fn test_byte_mode_round_trip() {
        let entries = vec![Entry::new(vec![0xe2, 0x8c], 3), Entry::new(vec![0x98], 1)];
        let mut buf = Vec::new();
        VocabSaver::new(&entries, SymbolMode::Bytes)
            .write_to(&mut buf)
            .unwrap();

        let (loaded, mode) = VocabLoader::from_reader(buf.as_slice()).unwrap();
        assert_eq!(mode, SymbolMode::Bytes);
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_word_counts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordcounts.json");
        let words = vec![WordCount::new("fo⌘o", 3), WordCount::new(vec![0xff], 1)];

        VocabSaver::save_word_counts(&path, &words).unwrap();
        assert_eq!(VocabLoader::load_word_counts(&path).unwrap(), words);
    }
}
