//! Greedy BPE vocabulary builder.
//!
//! The builder owns every word and the vocabulary set. One merge iteration
//! rewrites the affected words on a rayon pool; workers only compute pair
//! deltas and send them over a channel to a single aggregator thread, which
//! is the only writer of the merge heap.

use super::checkpoint;
use super::counter::PairCounter;
use super::word::{SymbolTable, TokenizedWord};
use ahash::{AHashMap, AHashSet};
use lexbpe_core::{
    sort_entries, Encoder, Entry, MergeCandidate, MergeHeap, MergedPair, Pair, Result, Symbol,
    SymbolMode, TokenizerError, VocabLoader, VocabSaver, WordCount,
};
use log::{debug, error, info};
use rayon::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Vocabulary sizes at which a checkpoint snapshot is written.
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 500;

/// Options for [`VocabBuilder::load_words`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadOptions {
    /// Stop once this fraction of all occurrences is loaded (0 = disabled)
    pub top_p: f64,
    /// Stop after the first word with at most this many occurrences
    /// (0 = disabled)
    pub word_count: u64,
}

impl LoadOptions {
    /// Create options with both cutoffs disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cumulative coverage cutoff.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the minimum word count cutoff.
    pub fn word_count(mut self, word_count: u64) -> Self {
        self.word_count = word_count;
        self
    }
}

/// Options for [`VocabBuilder::merge`].
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Maximum number of merges (0 = unbounded)
    pub iterations: usize,
    /// Stop when the best pair occurs at most this often (0 = disabled)
    pub min_pair_frequency: u64,
    /// Stop when the vocabulary reaches this size (0 = disabled)
    pub max_vocab_size: usize,
    /// Worker threads for applying merges (0 = 1)
    pub concurrency: usize,
    /// Directory for word counts and vocabulary snapshots
    pub checkpoint_dir: Option<PathBuf>,
    /// Snapshot whenever the vocabulary size is a multiple of this
    pub checkpoint_interval: usize,
    /// Checked before every iteration; training stops once it is set
    pub abort: Option<Arc<AtomicBool>>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            iterations: 0,
            min_pair_frequency: 0,
            max_vocab_size: 0,
            concurrency: 1,
            checkpoint_dir: None,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            abort: None,
        }
    }
}

impl MergeOptions {
    /// Create a builder for merge options.
    pub fn builder() -> MergeOptionsBuilder {
        MergeOptionsBuilder::new()
    }

    fn aborted(&self) -> bool {
        self.abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Builder for [`MergeOptions`].
#[derive(Debug, Clone, Default)]
pub struct MergeOptionsBuilder {
    options: MergeOptions,
}

impl MergeOptionsBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of merges.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.options.iterations = iterations;
        self
    }

    /// Set the minimum pair frequency.
    pub fn min_pair_frequency(mut self, freq: u64) -> Self {
        self.options.min_pair_frequency = freq;
        self
    }

    /// Set the maximum vocabulary size.
    pub fn max_vocab_size(mut self, size: usize) -> Self {
        self.options.max_vocab_size = size;
        self
    }

    /// Set the number of worker threads.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.options.concurrency = concurrency;
        self
    }

    /// Write checkpoints into `dir`.
    pub fn checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.checkpoint_dir = Some(dir.into());
        self
    }

    /// Set the snapshot interval.
    pub fn checkpoint_interval(mut self, interval: usize) -> Self {
        self.options.checkpoint_interval = interval;
        self
    }

    /// Stop training once `flag` is set.
    pub fn abort(mut self, flag: Arc<AtomicBool>) -> Self {
        self.options.abort = Some(flag);
        self
    }

    /// Build the options.
    pub fn build(self) -> Result<MergeOptions> {
        if self.options.checkpoint_dir.is_some() && self.options.checkpoint_interval == 0 {
            return Err(TokenizerError::InvalidConfig(
                "checkpoint_interval must be positive when checkpointing".to_string(),
            ));
        }
        Ok(self.options)
    }
}

/// Why [`VocabBuilder::merge`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The vocabulary reached `max_vocab_size`
    MaxVocabSize,
    /// The best pair occurs at most `min_pair_frequency` times
    MinPairFrequency,
    /// No pair occurs more than once
    NoRepeatedPairs,
    /// `iterations` merges were performed
    Iterations,
    /// There are no pairs left
    Exhausted,
    /// The abort flag was set
    Aborted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::MaxVocabSize => "reached max vocab size",
            StopReason::MinPairFrequency => "reached min pair frequency",
            StopReason::NoRepeatedPairs => "no pair occurs more than once",
            StopReason::Iterations => "reached iteration limit",
            StopReason::Exhausted => "no pairs left",
            StopReason::Aborted => "aborted",
        };
        f.write_str(reason)
    }
}

/// Learns a BPE vocabulary from word counts.
///
/// Not safe for concurrent external use; `merge` parallelizes internally.
pub struct VocabBuilder {
    /// How new words are split into base units
    mode: SymbolMode,
    /// Initial segmentation for new words, when bootstrapping
    encoder: Option<Encoder>,
    /// Interned symbols
    symbols: SymbolTable,
    /// Word bytes -> position in `words`
    word_index: AHashMap<Vec<u8>, usize>,
    /// Distinct words
    words: Vec<TokenizedWord>,
    /// Every symbol ever produced
    vocab: AHashSet<u32>,
    /// Merges in the order they were made
    merge_log: Vec<MergedPair>,
}

impl VocabBuilder {
    /// Create an empty builder that splits words per `mode`.
    pub fn new(mode: SymbolMode) -> Self {
        Self {
            mode,
            encoder: None,
            symbols: SymbolTable::new(),
            word_index: AHashMap::new(),
            words: Vec::new(),
            vocab: AHashSet::new(),
            merge_log: Vec::new(),
        }
    }

    /// Continue training from the vocabulary file at `path`.
    pub fn with_vocab<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_encoder(Encoder::new(path)?))
    }

    /// Continue training from an existing encoder.
    ///
    /// New words start from the encoder's segmentation, and every entry of
    /// its vocabulary is part of the vocabulary being built.
    pub fn from_encoder(encoder: Encoder) -> Self {
        let mut builder = Self::new(encoder.mode());
        for symbol in encoder.vocab() {
            let id = builder.symbols.intern(symbol.clone());
            builder.vocab.insert(id);
        }
        builder.encoder = Some(encoder);
        builder
    }

    /// Register `count` occurrences of `word`.
    pub fn add(&mut self, word: impl AsRef<[u8]>, count: u64) {
        let word = word.as_ref();
        let idx = match self.word_index.get(word) {
            Some(&idx) => idx,
            None => self.insert_word(word),
        };
        self.words[idx].incr(count);
    }

    /// Register one occurrence of each word.
    pub fn add_words<I, W>(&mut self, words: I)
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[u8]>,
    {
        for word in words {
            self.add(word, 1);
        }
    }

    fn insert_word(&mut self, word: &[u8]) -> usize {
        let pieces = match &self.encoder {
            Some(encoder) => encoder.encode(word).unwrap_or_else(|| {
                debug!(
                    "cannot segment {:?} with the bootstrap vocabulary",
                    Symbol::from(word)
                );
                Vec::new()
            }),
            None => self.mode.split(word),
        };

        let tokens: Vec<u32> = pieces
            .into_iter()
            .map(|piece| self.symbols.intern(piece))
            .collect();
        self.vocab.extend(tokens.iter().copied());

        let idx = self.words.len();
        self.words.push(TokenizedWord::new(tokens));
        self.word_index.insert(word.to_vec(), idx);
        idx
    }

    /// Load a word-count file, most frequent words first.
    ///
    /// Returns the number of words loaded.
    pub fn load_words<P: AsRef<Path>>(&mut self, path: P, opts: LoadOptions) -> Result<usize> {
        if !(0.0..=1.0).contains(&opts.top_p) {
            return Err(TokenizerError::InvalidConfig(format!(
                "top_p must be within [0, 1], got {}",
                opts.top_p
            )));
        }

        let path = path.as_ref();
        info!("loading words from {}", path.display());

        let mut words = VocabLoader::load_word_counts(path)?;
        words.sort_by(|a, b| b.count.cmp(&a.count));

        info!("found {} words, loading...", words.len());
        let total: u64 = words.iter().map(|w| w.count).sum();

        let mut loaded = 0u64;
        let mut added = 0;
        for (idx, word) in words.iter().enumerate() {
            self.add(&word.word, word.count);
            loaded += word.count;
            added += 1;

            let top = if total > 0 {
                loaded as f64 / total as f64
            } else {
                1.0
            };
            if idx % 100_000 == 0 {
                debug!(
                    "loaded {} ({:.4}, top {:.4}, wordcount {})...",
                    idx,
                    idx as f64 / words.len() as f64,
                    top,
                    word.count
                );
            }
            if opts.word_count > 0 && word.count <= opts.word_count {
                info!(
                    "stopped at {} out of {}, reached wordcount {} ({} out of {}, {:.4})",
                    idx,
                    words.len(),
                    opts.word_count,
                    loaded,
                    total,
                    top
                );
                break;
            }
            if opts.top_p > 0.0 && top >= opts.top_p {
                info!(
                    "stopped at {} out of {}, reached top {:.4} ({} out of {}, {})",
                    idx,
                    words.len(),
                    opts.top_p,
                    loaded,
                    total,
                    word.count
                );
                break;
            }
        }

        info!("finished loading {} words", added);
        Ok(added)
    }

    /// Number of distinct words registered.
    pub fn words(&self) -> usize {
        self.words.len()
    }

    /// How words are split into base units.
    pub fn mode(&self) -> SymbolMode {
        self.mode
    }

    /// Run greedy merges until a stop condition is met.
    ///
    /// # Panics
    ///
    /// Panics if the merged pair still has a nonzero count after its deltas
    /// are applied. That means the pair bookkeeping is corrupt.
    pub fn merge(&mut self, opts: &MergeOptions) -> Result<StopReason> {
        let workers = opts.concurrency.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| {
                TokenizerError::InvalidConfig(format!("Failed to build worker pool: {}", e))
            })?;

        info!("constructing pairs for {} words...", self.words.len());
        let counter = PairCounter::new(&self.words);
        let counts = pool.install(|| counter.count_pairs_parallel());
        let symbols = &self.symbols;
        let mut heap = MergeHeap::from_candidates(
            counts
                .into_iter()
                .map(|(pair, count)| MergeCandidate::new(pair, symbols.merged(pair), count)),
        );

        if let Some(dir) = &opts.checkpoint_dir {
            checkpoint::save_word_counts(dir, self.word_counts())?;
        }

        info!("starting merge with {} pairs", heap.len());
        let mut last_checkpoint = None;
        let mut iteration = 0;
        let mut start = Instant::now();

        let reason = loop {
            if opts.aborted() {
                break StopReason::Aborted;
            }
            if opts.iterations > 0 && iteration >= opts.iterations {
                break StopReason::Iterations;
            }
            let Some(top) = heap.peek() else {
                break StopReason::Exhausted;
            };
            let pair = top.pair;
            let count = top.count;
            let merged = top.merged.clone();

            if let Some(dir) = &opts.checkpoint_dir {
                let size = self.vocab.len();
                if size > 0
                    && size % opts.checkpoint_interval.max(1) == 0
                    && last_checkpoint != Some(size)
                {
                    checkpoint::save_snapshot(dir, &self.vocab(), self.mode)?;
                    last_checkpoint = Some(size);
                }
            }

            if opts.max_vocab_size > 0 && self.vocab.len() >= opts.max_vocab_size {
                break StopReason::MaxVocabSize;
            }
            if opts.min_pair_frequency > 0 && count <= opts.min_pair_frequency as i64 {
                break StopReason::MinPairFrequency;
            }
            if count <= 1 {
                break StopReason::NoRepeatedPairs;
            }

            debug!(
                "[iter: {}] vocab: {}, words: {}, most frequent pair count: {}, ({:?},{:?}) took {:?}",
                iteration,
                self.vocab.len(),
                self.words.len(),
                count,
                merged.parent1,
                merged.parent2,
                start.elapsed()
            );
            start = Instant::now();

            let joined = self.symbols.intern(merged.joined.clone());
            self.merge_log.push(merged);
            self.apply_merge(&pool, &mut heap, pair, joined, workers);

            let residual = heap.count(pair).unwrap_or(0);
            if residual != 0 {
                let recount = PairCounter::new(&self.words)
                    .count_pairs_sequential()
                    .get(&pair)
                    .copied()
                    .unwrap_or(0);
                let merged = self.symbols.merged(pair);
                error!(
                    "pair ({:?},{:?}) still has count of {} after merging",
                    merged.parent1, merged.parent2, residual
                );
                panic!(
                    "pair ({:?},{:?}) still has count of {}, originally had {}, recomputed: {}",
                    merged.parent1, merged.parent2, residual, count, recount
                );
            }
            heap.remove(pair);

            self.vocab.insert(joined);
            iteration += 1;
        };

        info!(
            "merge stopped after {} iterations ({}), vocab size {}",
            iteration,
            reason,
            self.vocab.len()
        );
        Ok(reason)
    }

    /// Merge `pair` in every word containing it and fold the deltas into
    /// `heap`.
    fn apply_merge(
        &mut self,
        pool: &rayon::ThreadPool,
        heap: &mut MergeHeap,
        pair: Pair,
        joined: u32,
        workers: usize,
    ) {
        let (tx, rx) = crossbeam_channel::bounded::<Vec<(Pair, i64)>>(10 * workers);
        let symbols = &self.symbols;
        let words = &mut self.words;

        std::thread::scope(|scope| {
            let aggregator = scope.spawn(move || {
                for deltas in rx {
                    for (p, delta) in deltas {
                        heap.adjust(p, delta, || symbols.merged(p));
                    }
                }
            });

            pool.install(|| {
                words
                    .par_iter_mut()
                    .filter(|word| word.contains(pair))
                    .for_each_with(tx, |tx, word| {
                        let deltas = word.merge_pair(pair, joined);
                        // The receiver only goes away if the aggregator panicked
                        let _ = tx.send(deltas);
                    });
            });

            if let Err(panic) = aggregator.join() {
                std::panic::resume_unwind(panic);
            }
        });
    }

    /// Every symbol ever produced with its current total frequency, in
    /// serialization order.
    pub fn vocab(&self) -> Vec<Entry> {
        let mut counts = self.current_token_ids();
        for &id in &self.vocab {
            counts.entry(id).or_insert(0);
        }

        let mut entries: Vec<Entry> = counts
            .into_iter()
            .map(|(id, count)| Entry::new(self.symbols.get(id).clone(), count))
            .collect();
        sort_entries(&mut entries);
        entries
    }

    /// Merges in the order they were made.
    pub fn merge_log(&self) -> &[MergedPair] {
        &self.merge_log
    }

    /// Every symbol in the vocabulary set.
    pub fn current_vocab(&self) -> AHashSet<Symbol> {
        self.vocab
            .iter()
            .map(|&id| self.symbols.get(id).clone())
            .collect()
    }

    /// Symbols in the current segmentations with their total frequency.
    pub fn current_tokens(&self) -> AHashMap<Symbol, u64> {
        self.current_token_ids()
            .into_iter()
            .map(|(id, count)| (self.symbols.get(id).clone(), count))
            .collect()
    }

    fn current_token_ids(&self) -> AHashMap<u32, u64> {
        let mut tokens = AHashMap::new();
        for word in &self.words {
            for &token in word.tokens() {
                *tokens.entry(token).or_insert(0) += word.count();
            }
        }
        tokens
    }

    fn word_counts(&self) -> Vec<WordCount> {
        self.word_index
            .iter()
            .map(|(word, &idx)| WordCount::new(word.clone(), self.words[idx].count()))
            .collect()
    }

    /// Write the vocabulary file, returning the bytes written.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<u64> {
        VocabSaver::new(&self.vocab(), self.mode).write_to(writer)
    }

    /// Write the vocabulary file to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TokenizerError::io(path, e))?;

        let mut writer = BufWriter::new(file);
        let written = self.write_to(&mut writer)?;
        writer.flush().map_err(|e| TokenizerError::io(path, e))?;

        Ok(written)
    }
}
