//! Synonym table and query expansion
//!
//! Lets a query written with one term (jargon, English, or Chinese) reach
//! items described with an interchangeable one.

use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Built-in entries: drafting and piping vocabulary in Chinese and English
const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "預製圖",
        &["預製圖", "預製", "預製配管圖", "shop drawing", "prefab", "pre-fab"],
    ),
    ("dwg", &["dwg", "autocad"]),
    ("管線", &["管線", "piping", "line", "line no", "line number"]),
];

/// Mapping from a canonical key to a set of interchangeable strings.
///
/// Keys and values are stored as written; matching happens against
/// tokenized, lowercased query forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let mut table = SynonymTable::empty();
        for (key, values) in DEFAULT_SYNONYMS {
            table.insert(*key, values.iter().copied());
        }
        table
    }
}

impl SynonymTable {
    /// Table with no entries
    pub fn empty() -> Self {
        SynonymTable {
            entries: BTreeMap::new(),
        }
    }

    /// Add values under `key`, merging with any existing set
    pub fn insert<K, I, V>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.entries
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Merge every entry of `other` into this table
    pub fn extend(&mut self, other: &BTreeMap<String, BTreeSet<String>>) {
        for (key, values) in other {
            self.insert(key.clone(), values.iter().cloned());
        }
    }

    /// Synonym set for a key
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand a raw query into itself plus its synonym alternates.
    ///
    /// - the verbatim query is always a member
    /// - a key equal to a query token contributes its whole set
    /// - an entry whose values contain the raw query or a query token
    ///   contributes its whole set and its key
    /// - blank members are dropped
    pub fn expand_query(&self, query: &str) -> BTreeSet<String> {
        let tokens = tokenize(query);
        let mut expanded = BTreeSet::new();
        expanded.insert(query.to_string());

        for token in &tokens {
            if let Some(values) = self.entries.get(token) {
                expanded.extend(values.iter().cloned());
            }
        }

        for (key, values) in &self.entries {
            let hit = values.contains(query) || tokens.iter().any(|t| values.contains(t));
            if hit {
                expanded.extend(values.iter().cloned());
                expanded.insert(key.clone());
            }
        }

        expanded.retain(|e| !e.trim().is_empty());
        expanded
    }

    /// Token set used for scoring: the expansion joined and re-tokenized
    pub fn query_tokens(&self, query: &str) -> Vec<String> {
        let expanded: Vec<String> = self.expand_query(query).into_iter().collect();
        tokenize(&expanded.join(" "))
    }
}
