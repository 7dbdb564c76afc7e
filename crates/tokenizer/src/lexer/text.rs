//! Reference lexer for plain text.
//!
//! Newlines and ASCII punctuation other than `_` are lexical tokens. Runs of
//! anything else that is not whitespace are split on Unicode word boundaries
//! and each piece is free text. Horizontal whitespace is dropped.

use super::{Lexer, Token, TokenKind};
use crate::lang::Language;
use lexbpe_core::{Result, TokenizerError};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Lexical ID of the end-of-file token.
pub const EOF: u32 = 0;
/// Lexical ID of a line break.
pub const NEWLINE: u32 = 1;
/// Lexical ID of free text too long to subword encode.
pub const IDENT: u32 = 2;

/// Free text longer than this many bytes is emitted as [`IDENT`].
pub const MAX_SUBWORD_LEN: usize = 80;

// ASCII punctuation except `_`, which stays inside identifiers
const TOKEN_PATTERN: &str = r"(?P<newline>\r\n|\r|\n)|(?P<space>[^\S\r\n]+)|(?P<punct>[!-/:-@\[-\^`{-~])|(?P<text>[^\s!-/:-@\[-\^`{-~]+)";

fn is_punct(b: u8) -> bool {
    b.is_ascii_punctuation() && b != b'_'
}

/// Lexer for plain text files.
#[derive(Debug, Clone)]
pub struct TextLexer {
    /// Alphabet names by lexical ID
    names: Vec<String>,
    /// Splits input into newline, space, punctuation and text runs
    pattern: Regex,
}

impl TextLexer {
    /// Create a new text lexer.
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(TOKEN_PATTERN)
            .map_err(|e| TokenizerError::InvalidConfig(format!("Invalid token pattern: {}", e)))?;

        let mut names = vec!["EOF".to_string(), "\n".to_string(), "IDENT".to_string()];
        names.extend(
            (b'!'..=b'~')
                .filter(|&b| is_punct(b))
                .map(|b| char::from(b).to_string()),
        );

        Ok(Self { names, pattern })
    }

    /// Lexical ID of an ASCII punctuation character.
    pub fn punct_id(&self, c: char) -> Option<u32> {
        if !c.is_ascii() || !is_punct(c as u8) {
            return None;
        }
        let offset = (b'!'..c as u8).filter(|&b| is_punct(b)).count();
        Some(IDENT + 1 + offset as u32)
    }

    fn push_text(tokens: &mut Vec<Token>, run: &str, start: usize) {
        for (offset, word) in run.split_word_bound_indices() {
            let span = start + offset..start + offset + word.len();
            if word.len() > MAX_SUBWORD_LEN {
                tokens.push(Token::lexical(IDENT, word, span));
            } else {
                tokens.push(Token::subword(word, span));
            }
        }
    }
}

impl Lexer for TextLexer {
    fn lang(&self) -> Language {
        Language::Text
    }

    fn lex(&self, buf: &[u8]) -> Result<Vec<Token>> {
        let text = std::str::from_utf8(buf)
            .map_err(|e| TokenizerError::Lex(format!("input is not valid UTF-8: {}", e)))?;

        let mut tokens = Vec::new();
        for caps in self.pattern.captures_iter(text) {
            if let Some(m) = caps.name("newline") {
                tokens.push(Token::lexical(NEWLINE, m.as_str(), m.range()));
            } else if let Some(m) = caps.name("punct") {
                let id = m.as_str().chars().next().and_then(|c| self.punct_id(c));
                if let Some(id) = id {
                    tokens.push(Token::lexical(id, m.as_str(), m.range()));
                }
            } else if let Some(m) = caps.name("text") {
                Self::push_text(&mut tokens, m.as_str(), m.start());
            }
        }
        tokens.push(Token::lexical(EOF, "", text.len()..text.len()));

        Ok(tokens)
    }

    fn should_subword_encode(&self, token: &Token) -> Option<Vec<String>> {
        match token.kind {
            TokenKind::Subword => Some(vec![format!("{}{}", token.lit, self.terminal_marker())]),
            TokenKind::Lexical(_) => None,
        }
    }

    fn tokens(&self) -> &[String] {
        &self.names
    }
}
