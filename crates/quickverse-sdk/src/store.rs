//! In-memory localization store.

use crate::model::LocalizationEntry;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Contents {
    language: Option<String>,
    entries: HashMap<String, String>,
}

/// Key/text pairs for the most recently fetched language.
///
/// The whole set is swapped on [`replace`](Self::replace); there is no
/// merging across fetches. Lookups are exact and case-sensitive.
#[derive(Debug, Default)]
pub struct LocalizationStore {
    contents: RwLock<Contents>,
}

impl LocalizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the active set, returning the number of distinct keys.
    ///
    /// If `entries` repeats a key, the last occurrence wins.
    pub fn replace(&self, entries: Vec<LocalizationEntry>, language: impl Into<String>) -> usize {
        let entries: HashMap<String, String> =
            entries.into_iter().map(|e| (e.key, e.text)).collect();
        let count = entries.len();

        let contents = Contents {
            language: Some(language.into()),
            entries,
        };
        *self.contents.write() = contents;
        count
    }

    /// Drop every entry.
    pub fn clear(&self) {
        *self.contents.write() = Contents::default();
    }

    /// Translated text for `key`.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.contents.read().entries.get(key).cloned()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.contents.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.read().entries.is_empty()
    }

    /// Language code the active set was fetched for.
    pub fn language(&self) -> Option<String> {
        self.contents.read().language.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<LocalizationEntry> {
        pairs.iter().map(|(k, v)| LocalizationEntry::new(*k, *v)).collect()
    }

    #[test]
    fn test_empty_store() {
        let store = LocalizationStore::new();
        assert!(store.is_empty());
        assert_eq!(store.lookup("anything"), None);
        assert_eq!(store.language(), None);
    }

    #[test]
    fn test_lookup_is_exact() {
        let store = LocalizationStore::new();
        store.replace(entries(&[("Greeting", "hello")]), "en");

        assert_eq!(store.lookup("Greeting").as_deref(), Some("hello"));
        assert_eq!(store.lookup("greeting"), None);
        assert_eq!(store.lookup("Greet"), None);
        assert_eq!(store.language().as_deref(), Some("en"));
    }

    #[test]
    fn test_replace_drops_old_keys() {
        let store = LocalizationStore::new();
        store.replace(entries(&[("A", "hello"), ("B", "world")]), "en");
        store.replace(entries(&[("B", "monde")]), "fr");

        assert_eq!(store.lookup("A"), None);
        assert_eq!(store.lookup("B").as_deref(), Some("monde"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let store = LocalizationStore::new();
        let count = store.replace(entries(&[("A", "first"), ("A", "second")]), "en");

        assert_eq!(count, 1);
        assert_eq!(store.lookup("A").as_deref(), Some("second"));
    }

    #[test]
    fn test_replace_with_nothing() {
        let store = LocalizationStore::new();
        store.replace(entries(&[("A", "hello")]), "en");
        assert_eq!(store.replace(Vec::new(), "de"), 0);
        assert!(store.is_empty());

        store.clear();
        assert_eq!(store.language(), None);
    }
}
