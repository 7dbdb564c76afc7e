//! On-disk record layouts.

use crate::core::{Entry, Symbol, SymbolMode};
use serde::{Deserialize, Serialize};

/// One vocabulary file record.
///
/// Byte-mode records carry only the bytes. Character-mode records carry the
/// string, plus the bytes when the symbol is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedEntry {
    /// Symbol text (character mode)
    #[serde(rename = "BytePair", default)]
    pub byte_pair: String,
    /// Symbol bytes (byte mode), base64 encoded
    #[serde(
        rename = "BytePairBytes",
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_opt"
    )]
    pub byte_pair_bytes: Option<Vec<u8>>,
    /// Aggregate frequency
    #[serde(rename = "Count")]
    pub count: u64,
}

impl SerializedEntry {
    /// Record for `entry` in the given mode.
    pub fn from_entry(entry: &Entry, mode: SymbolMode) -> Self {
        match mode {
            SymbolMode::Chars => Self {
                byte_pair: entry.symbol.to_string_lossy().into_owned(),
                byte_pair_bytes: match entry.symbol.as_str() {
                    Some(_) => None,
                    None => Some(entry.symbol.as_bytes().to_vec()),
                },
                count: entry.count,
            },
            SymbolMode::Bytes => Self {
                byte_pair: String::new(),
                byte_pair_bytes: Some(entry.symbol.as_bytes().to_vec()),
                count: entry.count,
            },
        }
    }

    /// Whether the record was written in byte mode.
    pub fn is_bytes(&self) -> bool {
        self.byte_pair.is_empty() && self.has_bytes()
    }

    fn has_bytes(&self) -> bool {
        self.byte_pair_bytes.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Convert to an entry, preferring the bytes field.
    pub fn into_entry(self) -> Entry {
        let symbol = match self.byte_pair_bytes {
            Some(bytes) if !bytes.is_empty() => Symbol::from(bytes),
            _ => Symbol::from(self.byte_pair),
        };
        Entry {
            symbol,
            count: self.count,
        }
    }
}

/// One word-count file record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    /// Raw word bytes, base64 encoded
    #[serde(rename = "Word", with = "base64_bytes")]
    pub word: Vec<u8>,
    /// Occurrences of the word
    #[serde(rename = "Count")]
    pub count: u64,
}

impl WordCount {
    /// Create a new word count.
    pub fn new(word: impl Into<Vec<u8>>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom)
    }
}

mod base64_opt {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
