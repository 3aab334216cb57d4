// src/aggregate/group.rs

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Buckets keyed by group value, kept in first-seen key order.
///
/// Buckets are created on first encounter and only mutated afterwards, so
/// iteration order is the order keys first appeared in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<B> {
    index: HashMap<String, usize>,
    entries: Vec<(String, B)>,
}

impl<B> Default for Grouped<B> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<B> Grouped<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for `key`, created with `init` if unseen.
    pub fn entry_with(&mut self, key: &str, init: impl FnOnce() -> B) -> &mut B {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push((key.to_string(), init()));
                self.index.insert(key.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, key: &str) -> Option<&B> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &B)> {
        self.entries.iter().map(|(k, b)| (k.as_str(), b))
    }

    pub fn into_entries(self) -> Vec<(String, B)> {
        self.entries
    }

    /// The `n` entries with the largest `key`, ties kept in first-seen order.
    pub fn top_by<F>(&self, n: usize, key: F) -> Vec<(&str, &B)>
    where
        F: Fn(&B) -> f64,
    {
        top_n(self.iter().collect(), n, |entry| key(entry.1))
    }
}

impl<B: Default> Grouped<B> {
    pub fn entry(&mut self, key: &str) -> &mut B {
        self.entry_with(key, B::default)
    }
}

impl<B: Serialize> Serialize for Grouped<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Stable descending sort on `key`, then keep the first `n` items.
pub fn top_n<T, F>(mut items: Vec<T>, n: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    items.truncate(n);
    items
}
