//! Before-context helpers for prediction windows.

use super::FileEncoder;
use std::path::Path;

impl FileEncoder {
    /// IDs every before-context starts with: start-of-file, preceded by the
    /// file's language tag in multilingual text groups.
    pub fn before_context_prefix(&self, filename: impl AsRef<Path>) -> Vec<u32> {
        match self.lang_tag_for_path(filename) {
            Some(tag) => vec![tag, 0],
            None => vec![0],
        }
    }

    /// Strip the before-context prefix from `context` if it starts with it.
    pub fn remove_before_context_prefix<'a>(
        &self,
        context: &'a [u32],
        filename: impl AsRef<Path>,
    ) -> &'a [u32] {
        let prefix = self.before_context_prefix(filename);
        context.strip_prefix(prefix.as_slice()).unwrap_or(context)
    }

    /// Fit `context` into `window` IDs with the prefix in front exactly once.
    ///
    /// The oldest IDs of the body are dropped first. A window too small for
    /// the prefix gets the leading part of the prefix.
    pub fn prepare_before_context(
        &self,
        context: &[u32],
        window: usize,
        filename: impl AsRef<Path>,
    ) -> Vec<u32> {
        let prefix = self.before_context_prefix(filename);
        if window <= prefix.len() {
            return prefix[..window].to_vec();
        }

        let body = context.strip_prefix(prefix.as_slice()).unwrap_or(context);
        let keep = window - prefix.len();
        let body = &body[body.len().saturating_sub(keep)..];

        let mut prepared = Vec::with_capacity(prefix.len() + body.len());
        prepared.extend_from_slice(&prefix);
        prepared.extend_from_slice(body);
        prepared
    }
}

#[cfg(test)]
mod tests {
    use crate::lang::{LangGroup, Language};
    use crate::FileEncoder;
    use lexbpe_core::{Entry, SymbolMode};

    fn encoder(group: LangGroup) -> FileEncoder {
        let entries = vec![Entry::new("a", 1), Entry::new("$", 1)];
        FileEncoder::from_vocab(entries, SymbolMode::Chars, group).unwrap()
    }

    #[test]
    fn test_prefix() {
        let fe = encoder(LangGroup::new(Language::Text));
        assert_eq!(fe.before_context_prefix("a.py"), vec![0]);

        let fe = encoder(LangGroup::text([Language::Python, Language::Golang]));
        let tag = fe.lang_tag_for_path("a.py").unwrap();
        assert_eq!(fe.before_context_prefix("a.py"), vec![tag, 0]);
        assert_eq!(fe.before_context_prefix("a.rs"), vec![0]);
    }

    #[test]
    fn test_remove_prefix() {
        let fe = encoder(LangGroup::new(Language::Text));
        assert_eq!(fe.remove_before_context_prefix(&[0, 5, 6], "a.txt"), &[5, 6]);
        assert_eq!(fe.remove_before_context_prefix(&[5, 6], "a.txt"), &[5, 6]);
        assert!(fe.remove_before_context_prefix(&[], "a.txt").is_empty());
    }

    #[test]
    fn test_prepare_adds_prefix_once() {
        let fe = encoder(LangGroup::new(Language::Text));

        assert_eq!(fe.prepare_before_context(&[5, 6], 8, "a.txt"), vec![0, 5, 6]);
        assert_eq!(fe.prepare_before_context(&[0, 5, 6], 8, "a.txt"), vec![0, 5, 6]);
    }

    #[test]
    fn test_prepare_respects_window() {
        let fe = encoder(LangGroup::text([Language::Python, Language::Golang]));
        let tag = fe.lang_tag_for_path("a.go").unwrap();

        let context = [tag, 0, 10, 11, 12, 13];
        let prepared = fe.prepare_before_context(&context, 4, "a.go");
        assert_eq!(prepared, vec![tag, 0, 12, 13]);

        let prepared = fe.prepare_before_context(&[10, 11, 12], 3, "a.go");
        assert_eq!(prepared, vec![tag, 0, 12]);

        assert_eq!(fe.prepare_before_context(&context, 1, "a.go"), vec![tag]);
        assert!(fe.prepare_before_context(&context, 0, "a.go").is_empty());
    }
}
