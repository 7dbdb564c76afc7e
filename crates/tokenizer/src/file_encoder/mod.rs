//! File-level encoding.
//!
//! A [`FileEncoder`] maps a whole file onto one flat ID space shared by the
//! lexer's fixed alphabet and the subword vocabulary:
//!
//! ```text
//! [0]                  start-of-file
//! [1 ..= L]            lexical tokens, L = lexer alphabet size
//! [L+1 ..= L+V]        vocabulary entries, V = vocabulary size
//! [L+V+1 .. end]       language tags, multilingual text groups only
//! [end]                separator
//! ```

mod context;

use crate::lang::{LangGroup, Language};
use crate::lexer::{new_lexer, Lexer, Token, TokenKind};
use ahash::AHashMap;
use compact_str::CompactString;
use lexbpe_core::{Encoder, Entry, Result, Symbol, SymbolMode};
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Table string of the start-of-file ID.
pub const SOF: &str = "SOF";
/// Table string of the separator ID.
pub const SEP: &str = "<sep>";

/// Table string of the tag for `lang`.
pub fn lang_tag(lang: Language) -> String {
    format!("<lang:{}>", lang.name())
}

/// Encodes files into IDs and back.
///
/// Immutable once built; share it across threads freely.
#[derive(Clone)]
pub struct FileEncoder {
    /// Subword encoder for free text
    encoder: Encoder,
    /// Lexer for the group's files
    lexer: Arc<dyn Lexer>,
    /// Languages the model covers
    group: LangGroup,
    /// String of every ID
    id_to_string: Vec<CompactString>,
    /// Last ID of every string
    string_to_id: AHashMap<CompactString, u32>,
    /// Tag ID per language
    tags: AHashMap<Language, u32>,
}

impl FileEncoder {
    /// Load the vocabulary at `vocab_path` and use the group's bundled lexer.
    pub fn new<P: AsRef<Path>>(vocab_path: P, group: LangGroup) -> Result<Self> {
        Self::from_encoder(Encoder::new(vocab_path)?, group)
    }

    /// Build from in-memory vocabulary entries.
    pub fn from_vocab(entries: Vec<Entry>, mode: SymbolMode, group: LangGroup) -> Result<Self> {
        Self::from_encoder(Encoder::from_vocab(entries, mode), group)
    }

    /// Wrap an existing encoder, using the group's bundled lexer.
    pub fn from_encoder(encoder: Encoder, group: LangGroup) -> Result<Self> {
        let lexer = new_lexer(group.lexer)?;
        Ok(Self::with_lexer(encoder, lexer, group))
    }

    /// Wrap an existing encoder with an external lexer.
    pub fn with_lexer(encoder: Encoder, lexer: Arc<dyn Lexer>, group: LangGroup) -> Self {
        let mut id_to_string: Vec<CompactString> =
            Vec::with_capacity(lexer.num_tokens() + encoder.size() + group.langs.len() + 2);

        id_to_string.push(CompactString::new(SOF));
        id_to_string.extend(lexer.tokens().iter().map(CompactString::new));
        id_to_string.extend(
            encoder
                .vocab()
                .map(|s| CompactString::new(s.to_string_lossy())),
        );

        let mut tags = AHashMap::new();
        if group.wants_lang_tags() {
            for &lang in &group.langs {
                tags.entry(lang).or_insert_with(|| {
                    id_to_string.push(CompactString::new(lang_tag(lang)));
                    (id_to_string.len() - 1) as u32
                });
            }
        }

        id_to_string.push(CompactString::new(SEP));

        let mut string_to_id = AHashMap::with_capacity(id_to_string.len());
        for (id, s) in id_to_string.iter().enumerate() {
            string_to_id.insert(s.clone(), id as u32);
        }

        debug!(
            "file encoder: {} lexical, {} subword, {} tags, size {}",
            lexer.num_tokens(),
            encoder.size(),
            tags.len(),
            id_to_string.len()
        );

        Self {
            encoder,
            lexer,
            group,
            id_to_string,
            string_to_id,
            tags,
        }
    }

    /// Encode a file into table strings.
    pub fn encode(&self, buf: &[u8], filename: impl AsRef<Path>) -> Result<Vec<String>> {
        let ids = self.encode_idx(buf, filename)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| self.id_to_string(id).map(str::to_string))
            .collect())
    }

    /// Encode a file into IDs, starting with the context prefix.
    pub fn encode_idx(&self, buf: &[u8], filename: impl AsRef<Path>) -> Result<Vec<u32>> {
        let tokens = self.lexer.lex(buf)?;
        let mut encoded = self.before_context_prefix(filename);
        encoded.extend(self.encode_tokens(&tokens));
        Ok(encoded)
    }

    /// Encode already lexed tokens.
    pub fn encode_tokens(&self, tokens: &[Token]) -> Vec<u32> {
        let mut encoded = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(literals) = self.lexer.should_subword_encode(token) {
                encoded.extend(self.encode_subtokens(&literals));
                continue;
            }
            match token.kind {
                TokenKind::Lexical(id) => encoded.push(id + 1),
                TokenKind::Subword => {
                    debug!("skipping free text {:?} the lexer did not encode", token.lit)
                }
            }
        }
        encoded
    }

    /// Encode subword literals into IDs of the subword range.
    ///
    /// Base units missing from the vocabulary are dropped. A literal left
    /// with nothing but its terminal marker contributes no IDs.
    pub fn encode_subtokens<S: AsRef<str>>(&self, literals: &[S]) -> Vec<u32> {
        let offset = self.num_lexical() as u32;
        let mut encoded = Vec::new();

        for literal in literals {
            let literal = literal.as_ref();
            let ids = match self.encoder.encode_idx(literal) {
                Some(ids) => ids,
                None => self.encode_lossy(literal),
            };
            encoded.extend(ids.into_iter().map(|id| id + offset));
        }

        encoded
    }

    fn encode_lossy(&self, literal: &str) -> Vec<u32> {
        let mut kept = Vec::with_capacity(literal.len());
        for unit in self.encoder.mode().split(literal.as_bytes()) {
            if self.encoder.entry(&unit).is_some() {
                kept.extend_from_slice(unit.as_bytes());
            } else {
                debug!("dropping unknown unit {:?} of {:?}", unit, literal);
            }
        }

        let marker = self.lexer.terminal_marker().as_bytes();
        if kept.strip_suffix(marker).unwrap_or(&kept).is_empty() {
            debug!("nothing of {:?} is representable", literal);
            return Vec::new();
        }
        self.encoder.encode_idx(&kept).unwrap_or_default()
    }

    /// Decode IDs back into tokens.
    ///
    /// Start-of-file is skipped. Tags and the separator end the pending
    /// subword run without producing a token. Decoded tokens carry empty spans.
    pub fn decode(&self, ids: &[u32]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pieces: Vec<Symbol> = Vec::new();
        let num_lexical = self.num_lexical() as u32;

        for &id in ids {
            if id == 0 {
                continue;
            }
            if self.is_lexical(id) {
                self.flush_pieces(&mut pieces, &mut tokens);
                let lexical = id - 1;
                tokens.push(Token::lexical(lexical, self.lexer.token_name(lexical), 0..0));
            } else if let Some(symbol) = self.encoder.vocabulary().get_symbol(id - num_lexical) {
                pieces.push(symbol.clone());
            } else {
                if !self.is_encoder_token(id) {
                    debug!("ignoring out of range id {}", id);
                }
                self.flush_pieces(&mut pieces, &mut tokens);
            }
        }
        self.flush_pieces(&mut pieces, &mut tokens);

        tokens
    }

    fn flush_pieces(&self, pieces: &mut Vec<Symbol>, tokens: &mut Vec<Token>) {
        if pieces.is_empty() {
            return;
        }
        for literal in self.lexer.merge_subword_pieces(pieces) {
            tokens.push(Token::subword(literal, 0..0));
        }
        pieces.clear();
    }

    /// Decode IDs into token literals.
    pub fn decode_to_strings(&self, ids: &[u32]) -> Vec<String> {
        self.decode(ids).into_iter().map(|t| t.lit).collect()
    }

    /// Table string of every ID, without regrouping subword pieces.
    pub fn decode_to_vocab(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| self.id_to_string(id).map(str::to_string))
            .collect()
    }

    /// Number of IDs.
    pub fn size(&self) -> usize {
        self.id_to_string.len()
    }

    /// ID of the separator, always the last one.
    pub fn sep_vocab_id(&self) -> u32 {
        (self.size() - 1) as u32
    }

    /// Number of lexical IDs including start-of-file.
    pub fn num_lexical(&self) -> usize {
        self.lexer.num_tokens() + 1
    }

    /// Check whether `id` is start-of-file or a lexical token.
    pub fn is_lexical(&self, id: u32) -> bool {
        (id as usize) < self.num_lexical()
    }

    /// Check whether `id` is the separator or a language tag.
    pub fn is_encoder_token(&self, id: u32) -> bool {
        id == self.sep_vocab_id() || self.tags.values().any(|&tag| tag == id)
    }

    /// Tag ID for the language of `path`, if the group uses tags and covers it.
    pub fn lang_tag_for_path(&self, path: impl AsRef<Path>) -> Option<u32> {
        if !self.group.wants_lang_tags() {
            return None;
        }
        self.tags.get(&Language::from_filename(path)).copied()
    }

    /// Table string of `id`.
    pub fn id_to_string(&self, id: u32) -> Option<&str> {
        self.id_to_string.get(id as usize).map(CompactString::as_str)
    }

    /// ID whose table string is `s`; the highest one when strings repeat.
    pub fn string_to_id(&self, s: &str) -> Option<u32> {
        self.string_to_id.get(s).copied()
    }

    /// The subword encoder.
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The lexer.
    pub fn lexer(&self) -> &Arc<dyn Lexer> {
        &self.lexer
    }

    /// The language group.
    pub fn group(&self) -> &LangGroup {
        &self.group
    }
}

impl std::fmt::Debug for FileEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEncoder")
            .field("lexer", &self.lexer.lang())
            .field("group", &self.group)
            .field("size", &self.size())
            .finish()
    }
}
