//! Training checkpoints.
//!
//! A checkpoint directory holds the word counts training started from and
//! vocabulary snapshots named after their size.

use lexbpe_core::{Entry, Result, SymbolMode, TokenizerError, VocabSaver, WordCount};
use log::info;
use std::path::{Path, PathBuf};

/// File the starting word counts are written to.
pub const WORD_COUNTS_FILE: &str = "wordcounts.json";

/// File name of the vocabulary snapshot taken at `size` entries.
pub fn snapshot_name(size: usize) -> String {
    format!("vocab-{}-entries.bpe", size)
}

/// Write the word counts, most frequent first.
pub fn save_word_counts(dir: &Path, mut words: Vec<WordCount>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| TokenizerError::io(dir, e))?;

    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));

    let path = dir.join(WORD_COUNTS_FILE);
    info!("[checkpoint] writing {} words and counts to {}", words.len(), path.display());
    VocabSaver::save_word_counts(&path, &words)?;

    Ok(path)
}

/// Write a vocabulary snapshot.
pub fn save_snapshot(dir: &Path, entries: &[Entry], mode: SymbolMode) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| TokenizerError::io(dir, e))?;

    let path = dir.join(snapshot_name(entries.len()));
    info!(
        "[checkpoint] writing vocab w/ size {} to {}",
        entries.len(),
        path.display()
    );
    VocabSaver::new(entries, mode).save(&path)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexbpe_core::VocabLoader;

    #[test]
    fn test_word_counts_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let words = vec![
            WordCount::new("b", 1),
            WordCount::new("a", 5),
            WordCount::new("c", 3),
        ];

        let path = save_word_counts(&dir.path().join("ckpt"), words).unwrap();
        let loaded = VocabLoader::load_word_counts(path).unwrap();

        let counts: Vec<u64> = loaded.iter().map(|w| w.count).collect();
        assert_eq!(counts, vec![5, 3, 1]);
    }

    #[test]
    fn test_snapshot_named_by_size() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![Entry::new("ab", 1), Entry::new("a", 1)];

        let path = save_snapshot(dir.path(), &entries, SymbolMode::Chars).unwrap();
        assert_eq!(path.file_name().unwrap(), "vocab-2-entries.bpe");
        assert_eq!(VocabLoader::load(&path).unwrap().len(), 2);
    }
}
