//! Memo of recent index lookups
//!
//! Entries are keyed by a structured [`CacheKey`] and hold a frozen snapshot
//! of the ids an index returned. The cache is bounded both by size (oldest
//! created entry goes first) and by age; expired entries are dropped lazily
//! on `get` or in bulk by [`IndexCache::cleanup_expired`]. The owning graph
//! invalidates entries eagerly on every write that could change them.

use super::{IdSet, IndexKind};
use crate::graph::{ElementId, ElementKind, PropertyValue};
use crate::platform::Clock;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Lookup parameters of a cached index query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheParams {
    Exact(PropertyValue),
    Composite(Vec<PropertyValue>),
    Range {
        min: Option<PropertyValue>,
        max: Option<PropertyValue>,
        include_min: bool,
        include_max: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: IndexKind,
    pub element_kind: ElementKind,
    pub keys: Vec<String>,
    pub params: CacheParams,
}

impl CacheKey {
    pub fn exact(element_kind: ElementKind, key: &str, value: &PropertyValue) -> Self {
        CacheKey {
            kind: IndexKind::Exact,
            element_kind,
            keys: vec![key.to_string()],
            params: CacheParams::Exact(value.clone()),
        }
    }

    pub fn composite(element_kind: ElementKind, keys: &[String], values: &[PropertyValue]) -> Self {
        CacheKey {
            kind: IndexKind::Composite,
            element_kind,
            keys: keys.to_vec(),
            params: CacheParams::Composite(values.to_vec()),
        }
    }

    pub fn range(
        element_kind: ElementKind,
        key: &str,
        min: Option<&PropertyValue>,
        max: Option<&PropertyValue>,
        include_min: bool,
        include_max: bool,
    ) -> Self {
        CacheKey {
            kind: IndexKind::Range,
            element_kind,
            keys: vec![key.to_string()],
            params: CacheParams::Range {
                min: min.cloned(),
                max: max.cloned(),
                include_min,
                include_max,
            },
        }
    }

    pub fn mentions(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    ids: Arc<IdSet>,
    created_at: u64,
    // breaks ties between entries created in the same millisecond
    seq: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub max_size: usize,
    pub hit_ratio: f64,
}

#[derive(Debug)]
pub struct IndexCache {
    entries: FxHashMap<CacheKey, CacheEntry>,
    clock: Arc<dyn Clock>,
    max_size: usize,
    max_age_ms: u64,
    next_seq: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl IndexCache {
    pub fn new(clock: Arc<dyn Clock>, max_size: usize, max_age_ms: u64) -> Self {
        IndexCache {
            entries: FxHashMap::default(),
            clock,
            max_size,
            max_age_ms,
            next_seq: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: u64) -> bool {
        now.saturating_sub(entry.created_at) >= self.max_age_ms
    }

    /// Store a result snapshot, evicting the oldest entry when full
    pub fn put(&mut self, key: CacheKey, ids: IdSet) -> Arc<IdSet> {
        let ids = Arc::new(ids);
        if self.max_size == 0 {
            return ids;
        }
        let now = self.clock.now_millis();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.cleanup_expired();
            while self.entries.len() >= self.max_size {
                self.evict_oldest();
            }
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            CacheEntry {
                ids: Arc::clone(&ids),
                created_at: now,
                seq,
            },
        );
        ids
    }

    /// Cached ids for `key`; an expired entry is evicted and counts as a miss
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<IdSet>> {
        let now = self.clock.now_millis();
        let expired = match self.entries.get(key) {
            None => {
                self.misses += 1;
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };
        if expired {
            self.entries.remove(key);
            self.evictions += 1;
            self.misses += 1;
            debug!(kind = %key.kind, keys = ?key.keys, "cache entry expired");
            return None;
        }
        self.hits += 1;
        self.entries.get(key).map(|entry| Arc::clone(&entry.ids))
    }

    /// Whether a live entry exists; does not touch statistics
    pub fn contains(&self, key: &CacheKey) -> bool {
        let now = self.clock.now_millis();
        self.entries
            .get(key)
            .is_some_and(|entry| !self.is_expired(entry, now))
    }

    pub fn remove(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.created_at, entry.seq))
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.evictions += 1;
            debug!(kind = %key.kind, keys = ?key.keys, "evicted oldest cache entry");
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        let max_age = self.max_age_ms;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.created_at) < max_age);
        let removed = before - self.entries.len();
        self.evictions += removed as u64;
        if removed > 0 {
            debug!(removed, "cleaned up expired cache entries");
        }
        removed
    }

    /// Drop every entry whose key list mentions `property_key`
    pub fn invalidate_key(&mut self, property_key: &str) -> usize {
        self.invalidate_where(|key, _| key.mentions(property_key))
    }

    /// Drop every entry produced by an index of `kind`
    pub fn invalidate_index_type(&mut self, kind: IndexKind) -> usize {
        self.invalidate_where(|key, _| key.kind == kind)
    }

    /// Drop every entry whose result contains `id`
    pub fn invalidate_element(&mut self, id: &ElementId) -> usize {
        self.invalidate_where(|_, entry| entry.ids.contains(id))
    }

    fn invalidate_where(&mut self, stale: impl Fn(&CacheKey, &CacheEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| !stale(key, entry));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn statistics(&self) -> CacheStatistics {
        let lookups = self.hits + self.misses;
        CacheStatistics {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            size: self.entries.len(),
            max_size: self.max_size,
            hit_ratio: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
        }
    }

    pub fn reset_statistics(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }
}
