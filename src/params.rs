//! Raw parameter storage.
//!
//! `ParameterStore` holds the `KEY -> VALUE` pairs scraped from an FSF file
//! exactly as written. It never interprets values; numeric coercion happens in
//! [`crate::config`] when the typed configuration is resolved.

use std::collections::HashMap;

/// Parsed FSF parameters, read-only once loading has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStore {
    entries: HashMap<String, String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Later assignments win.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up `key`, falling back to `default` when it is absent.
    ///
    /// Never fails: every lookup resolves to either the stored value or the
    /// caller's default.
    pub fn get<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Look up an optional value. Missing, empty and whitespace-only values
    /// are all reported as absent.
    pub fn optional(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
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
}

impl<K, V> FromIterator<(K, V)> for ParameterStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (k, v) in iter {
            store.insert(k, v);
        }
        store
    }
}
