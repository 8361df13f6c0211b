//! Ordered key → value index shared by both record sources.

use indexmap::IndexMap;

/// Number of entries shown in progress samples.
pub const SAMPLE_SIZE: usize = 10;

/// Mapping from a record identifier to its resolution value.
///
/// Keys are unique and keep their first insertion position. Inserting an
/// existing key replaces the value in place (last write wins), so iteration
/// order is the order in which each key was first seen: the query's sort
/// order for the database index, document order for the XML index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIndex {
    entries: IndexMap<String, String>,
}

impl RecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values in index order, duplicates included.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    /// The first [`SAMPLE_SIZE`] entries, for progress output.
    pub fn sample(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().take(SAMPLE_SIZE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RecordIndex {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (key, value) in iter {
            index.insert(key, value);
        }
        index
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for RecordIndex {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
