//! The lexer boundary.
//!
//! A [`Lexer`] turns a file into [`Token`]s drawn from a fixed lexical
//! alphabet plus free-text tokens that are subword encoded. Subword literals
//! carry a terminal marker so a run of subword pieces can be split back into
//! literals after decoding.

pub mod text;

pub use text::TextLexer;

use crate::lang::Language;
use lexbpe_core::{Result, Symbol, TokenizerError};
use std::ops::Range;
use std::sync::Arc;

/// Terminal marker used by the bundled lexers.
pub const TERMINAL_MARKER: &str = "$";

/// What a token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An entry of the lexer's fixed alphabet
    Lexical(u32),
    /// Free text that is subword encoded
    Subword,
}

/// One lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Alphabet entry or free text
    pub kind: TokenKind,
    /// Source text of the token
    pub lit: String,
    /// Byte range in the source; empty for decoded tokens
    pub span: Range<usize>,
}

impl Token {
    /// Create a lexical token.
    pub fn lexical(id: u32, lit: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind: TokenKind::Lexical(id),
            lit: lit.into(),
            span,
        }
    }

    /// Create a free-text token.
    pub fn subword(lit: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind: TokenKind::Subword,
            lit: lit.into(),
            span,
        }
    }

    /// Alphabet index of a lexical token.
    pub fn lexical_id(&self) -> Option<u32> {
        match self.kind {
            TokenKind::Lexical(id) => Some(id),
            TokenKind::Subword => None,
        }
    }
}

/// A language lexer as seen by the file encoder.
pub trait Lexer: Send + Sync {
    /// Language this lexer reads.
    fn lang(&self) -> Language;

    /// Split a file into tokens.
    fn lex(&self, buf: &[u8]) -> Result<Vec<Token>>;

    /// Literals to subword encode for `token`, each ending with the terminal
    /// marker, or `None` if the token is emitted as its lexical ID.
    ///
    /// `Some(vec![])` consumes the token without emitting anything.
    fn should_subword_encode(&self, token: &Token) -> Option<Vec<String>>;

    /// The fixed alphabet; position is the lexical ID.
    fn tokens(&self) -> &[String];

    /// Size of the fixed alphabet.
    fn num_tokens(&self) -> usize {
        self.tokens().len()
    }

    /// Name of a lexical ID.
    ///
    /// Panics if `id` is outside the alphabet.
    fn token_name(&self, id: u32) -> &str {
        &self.tokens()[id as usize]
    }

    /// Marker appended to every subword literal.
    fn terminal_marker(&self) -> &str {
        TERMINAL_MARKER
    }

    /// Regroup decoded subword pieces into literals.
    ///
    /// Pieces are joined as raw bytes, so byte-level pieces holding part of a
    /// UTF-8 sequence decode correctly. A literal ends at a piece carrying the
    /// terminal marker, or at the last piece. The marker is removed.
    fn merge_subword_pieces(&self, pieces: &[Symbol]) -> Vec<String> {
        let marker = self.terminal_marker().as_bytes();
        let mut literals = Vec::new();
        let mut pending: Vec<u8> = Vec::new();

        for (i, piece) in pieces.iter().enumerate() {
            pending.extend_from_slice(piece.as_bytes());
            if pending.ends_with(marker) || i == pieces.len() - 1 {
                let literal = std::mem::take(&mut pending);
                let literal = literal.strip_suffix(marker).unwrap_or(&literal);
                literals.push(String::from_utf8_lossy(literal).into_owned());
            }
        }

        literals
    }

    /// Remove the terminal marker from the end of `word`, if present.
    fn trim_terminal<'a>(&self, word: &'a str) -> &'a str {
        word.strip_suffix(self.terminal_marker()).unwrap_or(word)
    }

    /// Whether `word` is missing its terminal marker.
    fn is_incomplete_token(&self, word: &str) -> bool {
        !word.ends_with(self.terminal_marker())
    }
}

/// The bundled lexer for `lang`.
///
/// Only the text lexer ships with this crate; other languages plug in through
/// [`crate::FileEncoder::with_lexer`].
pub fn new_lexer(lang: Language) -> Result<Arc<dyn Lexer>> {
    match lang {
        Language::Text => Ok(Arc::new(TextLexer::new()?)),
        other => Err(TokenizerError::UnsupportedLanguage(other.name().to_string())),
    }
}
