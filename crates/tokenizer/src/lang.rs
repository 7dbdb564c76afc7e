//! Source languages and language groups.

use std::fmt;
use std::path::Path;

/// A source language a file can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Text,
    Golang,
    Python,
    JavaScript,
    Java,
    C,
    Cpp,
    Rust,
    TypeScript,
    Unknown,
}

impl Language {
    /// Every known language, `Unknown` excluded.
    pub const ALL: [Language; 9] = [
        Language::Text,
        Language::Golang,
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Rust,
        Language::TypeScript,
    ];

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Language::Text => "text",
            Language::Golang => "go",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::TypeScript => "typescript",
            Language::Unknown => "unknown",
        }
    }

    /// Parse a name produced by [`Language::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }

    /// Guess the language of a file from its extension.
    pub fn from_filename(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt" | "md" | "rst") => Language::Text,
            Some("go") => Language::Golang,
            Some("py" | "pyi" | "pyw") => Language::Python,
            Some("js" | "jsx" | "mjs" | "cjs") => Language::JavaScript,
            Some("java") => Language::Java,
            Some("c" | "h") => Language::C,
            Some("cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx") => Language::Cpp,
            Some("rs") => Language::Rust,
            Some("ts" | "tsx") => Language::TypeScript,
            _ => Language::Unknown,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The languages one model covers and the lexer it reads them with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangGroup {
    /// Lexer used for every file
    pub lexer: Language,
    /// Languages the model was trained on, in tag order
    pub langs: Vec<Language>,
}

impl LangGroup {
    /// A single-language group lexed by that language's lexer.
    pub fn new(lang: Language) -> Self {
        Self {
            lexer: lang,
            langs: vec![lang],
        }
    }

    /// A group of languages all read with the text lexer.
    pub fn text(langs: impl IntoIterator<Item = Language>) -> Self {
        Self {
            lexer: Language::Text,
            langs: langs.into_iter().collect(),
        }
    }

    /// Whether the group covers more than one language.
    pub fn is_multilingual(&self) -> bool {
        self.langs.len() > 1
    }

    /// Whether files get a language tag in front of their start-of-file.
    pub fn wants_lang_tags(&self) -> bool {
        self.lexer == Language::Text && self.is_multilingual()
    }

    /// Check whether `lang` is part of the group.
    pub fn contains(&self, lang: Language) -> bool {
        self.langs.contains(&lang)
    }
}
