//! Hash-based exact-match property index
//!
//! `key -> (value -> set of element ids)`. Any value, comparable or not, can
//! be indexed because [`PropertyValue`] hashes every variant.

use super::IdSet;
use crate::graph::{Element, ElementId, PropertyValue};
use rustc_hash::FxHashMap;
use tracing::debug;

type Buckets = FxHashMap<PropertyValue, IdSet>;

#[derive(Debug, Clone, Default)]
pub struct ExactIndex {
    indices: FxHashMap<String, Buckets>,
}

impl ExactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start indexing `key`. Returns false if it was already indexed.
    pub fn create_index(&mut self, key: &str) -> bool {
        if self.indices.contains_key(key) {
            return false;
        }
        self.indices.insert(key.to_string(), Buckets::default());
        true
    }

    pub fn drop_index(&mut self, key: &str) -> bool {
        self.indices.remove(key).is_some()
    }

    pub fn has_index(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    /// Indexed keys in sorted order
    pub fn indexed_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.indices.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn insert(&mut self, key: &str, value: &PropertyValue, id: &ElementId) {
        if let Some(buckets) = self.indices.get_mut(key) {
            buckets.entry(value.clone()).or_default().insert(id.clone());
        }
    }

    pub fn remove(&mut self, key: &str, value: &PropertyValue, id: &ElementId) {
        if let Some(buckets) = self.indices.get_mut(key) {
            if let Some(ids) = buckets.get_mut(value) {
                ids.remove(id);
                if ids.is_empty() {
                    buckets.remove(value);
                }
            }
        }
    }

    /// Move `id` from the bucket of `old` to the bucket of `new`
    pub fn auto_update(
        &mut self,
        key: &str,
        new: Option<&PropertyValue>,
        old: Option<&PropertyValue>,
        id: &ElementId,
    ) {
        if !self.has_index(key) {
            return;
        }
        if let Some(old) = old {
            self.remove(key, old, id);
        }
        if let Some(new) = new {
            self.insert(key, new, id);
        }
    }

    pub fn bucket(&self, key: &str, value: &PropertyValue) -> Option<&IdSet> {
        self.indices.get(key)?.get(value)
    }

    /// Ids whose value under `key` equals `value`
    pub fn get(&self, key: &str, value: &PropertyValue) -> IdSet {
        self.bucket(key, value).cloned().unwrap_or_default()
    }

    pub fn count(&self, key: &str, value: &PropertyValue) -> usize {
        self.bucket(key, value).map_or(0, IdSet::len)
    }

    /// Add every indexed value of `element`
    pub fn index_element(&mut self, element: &dyn Element) {
        let Self { indices } = self;
        for (key, buckets) in indices.iter_mut() {
            for value in element.values(key) {
                buckets.entry(value.clone()).or_default().insert(element.id().clone());
            }
        }
    }

    /// Remove every indexed value of `element`
    pub fn unindex_element(&mut self, element: &dyn Element) {
        let keys: Vec<String> = self.indices.keys().cloned().collect();
        for key in keys {
            for value in element.values(&key) {
                self.remove(&key, value, element.id());
            }
        }
    }

    /// Clear `key` and rescan `elements`
    pub fn rebuild<'a, E, I>(&mut self, key: &str, elements: I)
    where
        E: Element + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let Some(buckets) = self.indices.get_mut(key) else {
            return;
        };
        buckets.clear();
        for element in elements {
            for value in element.values(key) {
                buckets.entry(value.clone()).or_default().insert(element.id().clone());
            }
        }
        debug!(key, distinct_values = buckets.len(), "rebuilt exact index");
    }

    /// Empty every bucket while keeping index definitions
    pub fn clear_entries(&mut self) {
        for buckets in self.indices.values_mut() {
            buckets.clear();
        }
    }

    pub fn distinct_values(&self, key: &str) -> usize {
        self.indices.get(key).map_or(0, FxHashMap::len)
    }

    /// Number of (value, id) pairs stored for `key`
    pub fn entry_count(&self, key: &str) -> usize {
        self.indices
            .get(key)
            .map_or(0, |buckets| buckets.values().map(IdSet::len).sum())
    }

    /// Snapshot of every bucket stored for `key`
    pub fn buckets(&self, key: &str) -> FxHashMap<PropertyValue, IdSet> {
        self.indices.get(key).cloned().unwrap_or_default()
    }
}
