//! lexbpe-tokenizer - File-level encoding
//!
//! This crate joins a language lexer's fixed token alphabet with a subword
//! vocabulary into one ID space, so a whole source file becomes a single
//! sequence of integers and back.
//!
//! # Features
//!
//! - Pluggable [`Lexer`] trait with a bundled [`TextLexer`]
//! - Fixed ID layout: start-of-file, lexical tokens, subwords, language
//!   tags, separator
//! - Decoding that regroups subword pieces into literals
//! - Prediction-window helpers for before-contexts
//!
//! # Example
//!
//! ```rust
//! use lexbpe_core::{Entry, SymbolMode};
//! use lexbpe_tokenizer::{FileEncoder, LangGroup, Language};
//!
//! let entries = ["h", "i", "$", "hi$"].iter().map(|s| Entry::new(*s, 1)).collect();
//! let fe = FileEncoder::from_vocab(entries, SymbolMode::Chars, LangGroup::new(Language::Text))?;
//!
//! let ids = fe.encode_idx(b"hi!", "greeting.txt")?;
//! assert_eq!(fe.decode_to_strings(&ids), ["hi", "!", "EOF"]);
//! # Ok::<(), lexbpe_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use lexbpe_core::{Result, TokenizerError};

// Languages
pub mod lang;
pub use lang::{LangGroup, Language};

// Lexer boundary
pub mod lexer;
pub use lexer::{new_lexer, Lexer, TextLexer, Token, TokenKind, TERMINAL_MARKER};

// File encoding
pub mod file_encoder;
pub use file_encoder::{lang_tag, FileEncoder, SEP, SOF};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
