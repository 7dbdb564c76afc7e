//! Loading vocabulary and word-count files.

use super::format::{SerializedEntry, WordCount};
use crate::core::{Entry, SymbolMode, Vocabulary};
use crate::{Result, TokenizerError};
use log::info;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Vocabulary loader - reads the files written by [`super::VocabSaver`].
pub struct VocabLoader;

impl VocabLoader {
    /// Load a vocabulary, keeping the file order as index order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
        let (entries, mode) = Self::load_entries(path)?;
        Ok(Vocabulary::new(entries, mode))
    }

    /// Load the entries of a vocabulary file and the mode they were written in.
    ///
    /// The file is in byte mode if any record carries only the bytes field.
    pub fn load_entries<P: AsRef<Path>>(path: P) -> Result<(Vec<Entry>, SymbolMode)> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TokenizerError::io(path, e))?;

        let (entries, mode) = Self::from_reader(BufReader::new(file)).map_err(|e| {
            TokenizerError::Load(format!("Failed to read vocabulary {}: {}", path.display(), e))
        })?;
        info!(
            "loaded {} vocabulary entries ({:?} mode) from {}",
            entries.len(),
            mode,
            path.display()
        );

        Ok((entries, mode))
    }

    /// Read vocabulary records from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<(Vec<Entry>, SymbolMode)> {
        let records: Vec<SerializedEntry> = serde_json::from_reader(reader)?;

        let mode = if records.iter().any(SerializedEntry::is_bytes) {
            SymbolMode::Bytes
        } else {
            SymbolMode::Chars
        };
        let entries = records.into_iter().map(SerializedEntry::into_entry).collect();

        Ok((entries, mode))
    }

    /// Load a word-count file.
    pub fn load_word_counts<P: AsRef<Path>>(path: P) -> Result<Vec<WordCount>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TokenizerError::io(path, e))?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            TokenizerError::Load(format!(
                "Failed to read word counts {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.bpe");
        let mut file = File::create(&path).unwrap();
        file.write_all(
            br#"[
  {"BytePair": "ab", "Count": 2},
  {"BytePair": "b", "Count": 1},
  {"BytePair": "a", "Count": 3}
]"#,
        )
        .unwrap();

        let vocab = VocabLoader::load(&path).unwrap();
        assert_eq!(vocab.mode(), SymbolMode::Chars);
        assert_eq!(vocab.get_id(b"ab"), Some(0));
        assert_eq!(vocab.get_id(b"a"), Some(2));
        assert_eq!(vocab.entries()[2].count, 3);
    }

    #[test]
    fn test_bytes_field_selects_byte_mode() {
        let json = r#"[{"BytePair": "", "BytePairBytes": "4g==", "Count": 1}]"#;
        let (entries, mode) = VocabLoader::from_reader(json.as_bytes()).unwrap();

        assert_eq!(mode, SymbolMode::Bytes);
        assert_eq!(entries[0].symbol.as_bytes(), &[0xe2]);
    }

    #[test]
    fn test_invalid_utf8_chars_stay_chars_mode() {
        let json = r#"[
  {"BytePair": "a\ufffd", "BytePairBytes": "Yf8=", "Count": 2},
  {"BytePair": "a", "Count": 1}
]"#;
        let (entries, mode) = VocabLoader::from_reader(json.as_bytes()).unwrap();

        assert_eq!(mode, SymbolMode::Chars);
        assert_eq!(entries[0].symbol.as_bytes(), &[b'a', 0xff]);
        assert_eq!(entries[1].symbol, "a");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = VocabLoader::load(dir.path().join("missing.bpe")).unwrap_err();
        assert!(matches!(err, TokenizerError::Io { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wordcounts.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = VocabLoader::load_word_counts(&path).unwrap_err();
        assert!(matches!(err, TokenizerError::Load(_)));
    }
}
