//! Manager for the property indices of one element kind
//!
//! Owns the exact, composite and range indices for either vertices or edges
//! and applies element lifecycle changes to all of them.

use super::composite::CompositeIndex;
use super::exact::ExactIndex;
use super::range::{DefaultRangeMap, RangeIndex, RangeMap};
use super::{IndexError, IndexKind, IndexResult};
use crate::graph::{Element, ElementKind, PropertyValue};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

/// Index definitions and sizes for one element kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStatistics {
    pub element_kind: ElementKind,
    pub exact_keys: Vec<String>,
    pub composite_keys: Vec<Vec<String>>,
    pub range_keys: Vec<String>,
    pub exact_entries: usize,
    pub composite_entries: usize,
    pub range_entries: usize,
}

impl IndexStatistics {
    pub fn index_count(&self) -> usize {
        self.exact_keys.len() + self.composite_keys.len() + self.range_keys.len()
    }
}

#[derive(Debug)]
pub struct IndexManager<M = DefaultRangeMap> {
    element_kind: ElementKind,
    exact: ExactIndex,
    composite: IndexMap<Vec<String>, CompositeIndex>,
    range: RangeIndex<M>,
}

impl IndexManager {
    pub fn new(element_kind: ElementKind) -> IndexResult<Self> {
        Self::with_range_map(element_kind)
    }
}

impl<M: RangeMap> IndexManager<M> {
    /// Manager whose range index stores its keys in `M`
    pub fn with_range_map(element_kind: ElementKind) -> IndexResult<Self> {
        if element_kind == ElementKind::VertexProperty {
            return Err(IndexError::InvalidIndexTarget(element_kind));
        }
        Ok(Self::empty(element_kind))
    }

    pub fn for_vertices() -> Self {
        Self::empty(ElementKind::Vertex)
    }

    pub fn for_edges() -> Self {
        Self::empty(ElementKind::Edge)
    }

    fn empty(element_kind: ElementKind) -> Self {
        IndexManager {
            element_kind,
            exact: ExactIndex::new(),
            composite: IndexMap::new(),
            range: RangeIndex::default(),
        }
    }

    pub fn element_kind(&self) -> ElementKind {
        self.element_kind
    }

    pub fn exact(&self) -> &ExactIndex {
        &self.exact
    }

    pub fn range(&self) -> &RangeIndex<M> {
        &self.range
    }

    pub fn composite(&self, keys: &[String]) -> Option<&CompositeIndex> {
        self.composite.get(keys)
    }

    /// Composite indices in creation order
    pub fn composites(&self) -> impl Iterator<Item = &CompositeIndex> {
        self.composite.values()
    }

    // ============================================================
    // Index definitions
    // ============================================================

    /// Create an exact index on `key` and backfill it from `elements`.
    /// Returns false when the index already exists.
    pub fn create_exact_index<'a, E, I>(&mut self, key: &str, elements: I) -> bool
    where
        E: Element + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        if !self.exact.create_index(key) {
            return false;
        }
        self.exact.rebuild(key, elements);
        info!(kind = %self.element_kind, key, "created exact index");
        true
    }

    pub fn drop_exact_index(&mut self, key: &str) -> bool {
        let dropped = self.exact.drop_index(key);
        if dropped {
            info!(kind = %self.element_kind, key, "dropped exact index");
        }
        dropped
    }

    pub fn has_exact_index(&self, key: &str) -> bool {
        self.exact.has_index(key)
    }

    pub fn create_composite_index<'a, E, I>(&mut self, keys: Vec<String>, elements: I) -> IndexResult<bool>
    where
        E: Element + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        if self.composite.contains_key(&keys) {
            return Ok(false);
        }
        let mut index = CompositeIndex::new(keys.clone())?;
        index.rebuild(elements);
        info!(kind = %self.element_kind, ?keys, tuples = index.distinct_tuples(), "created composite index");
        self.composite.insert(keys, index);
        Ok(true)
    }

    pub fn drop_composite_index(&mut self, keys: &[String]) -> bool {
        let dropped = self.composite.shift_remove(keys).is_some();
        if dropped {
            info!(kind = %self.element_kind, ?keys, "dropped composite index");
        }
        dropped
    }

    pub fn has_composite_index(&self, keys: &[String]) -> bool {
        self.composite.contains_key(keys)
    }

    pub fn create_range_index<'a, E, I>(&mut self, key: &str, elements: I) -> bool
    where
        E: Element + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        if !self.range.create_index(key) {
            return false;
        }
        self.range.rebuild(key, elements);
        info!(kind = %self.element_kind, key, "created range index");
        true
    }

    pub fn drop_range_index(&mut self, key: &str) -> bool {
        let dropped = self.range.drop_index(key);
        if dropped {
            info!(kind = %self.element_kind, key, "dropped range index");
        }
        dropped
    }

    pub fn has_range_index(&self, key: &str) -> bool {
        self.range.has_index(key)
    }

    /// Whether any index kind covers `key`
    pub fn is_indexed(&self, key: &str) -> bool {
        self.exact.has_index(key)
            || self.range.has_index(key)
            || self.composite.keys().any(|keys| keys.iter().any(|k| k == key))
    }

    /// Index kinds that currently cover `key`
    pub fn kinds_covering(&self, key: &str) -> Vec<IndexKind> {
        let mut kinds = Vec::new();
        if self.exact.has_index(key) {
            kinds.push(IndexKind::Exact);
        }
        if self.composite.values().any(|index| index.covers(key)) {
            kinds.push(IndexKind::Composite);
        }
        if self.range.has_index(key) {
            kinds.push(IndexKind::Range);
        }
        kinds
    }

    // ============================================================
    // Auto-update hooks
    // ============================================================

    pub fn on_element_added(&mut self, element: &dyn Element) {
        self.exact.index_element(element);
        self.range.index_element(element);
        for index in self.composite.values_mut() {
            index.update_element(element);
        }
    }

    pub fn on_element_removed(&mut self, element: &dyn Element) {
        self.exact.unindex_element(element);
        self.range.unindex_element(element);
        for index in self.composite.values_mut() {
            index.remove_element(element.id());
        }
    }

    /// Move `element` between buckets after a value under `key` changed.
    /// `element` is already in its post-mutation state; `old` is reported
    /// only when the element no longer holds that value.
    pub fn on_property_changed(
        &mut self,
        element: &dyn Element,
        key: &str,
        new: Option<&PropertyValue>,
        old: Option<&PropertyValue>,
    ) {
        let id = element.id();
        self.exact.auto_update(key, new, old, id);
        self.range.auto_update(key, new, old, id);
        for index in self.composite.values_mut().filter(|index| index.covers(key)) {
            index.update_element(element);
        }
        debug!(kind = %self.element_kind, key, %id, "index auto-update");
    }

    /// Rescan `elements` into every index definition
    pub fn rebuild_all<'a, E, I>(&mut self, elements: I)
    where
        E: Element + 'a,
        I: IntoIterator<Item = &'a E> + Clone,
    {
        let exact_keys: Vec<String> = self.exact.indexed_keys().into_iter().map(String::from).collect();
        for key in &exact_keys {
            self.exact.rebuild(key, elements.clone());
        }
        let range_keys: Vec<String> = self.range.indexed_keys().into_iter().map(String::from).collect();
        for key in &range_keys {
            self.range.rebuild(key, elements.clone());
        }
        for index in self.composite.values_mut() {
            index.rebuild(elements.clone());
        }
        info!(kind = %self.element_kind, indices = exact_keys.len() + range_keys.len() + self.composite.len(), "rebuilt indices");
    }

    /// Empty every bucket while keeping all definitions
    pub fn clear_entries(&mut self) {
        self.exact.clear_entries();
        self.range.clear_entries();
        for index in self.composite.values_mut() {
            index.clear_entries();
        }
    }

    /// Forget every definition
    pub fn drop_all(&mut self) {
        self.exact = ExactIndex::new();
        self.range = RangeIndex::default();
        self.composite.clear();
    }

    pub fn statistics(&self) -> IndexStatistics {
        let exact_keys: Vec<String> = self.exact.indexed_keys().into_iter().map(String::from).collect();
        let range_keys: Vec<String> = self.range.indexed_keys().into_iter().map(String::from).collect();
        IndexStatistics {
            element_kind: self.element_kind,
            exact_entries: exact_keys.iter().map(|k| self.exact.entry_count(k)).sum(),
            range_entries: range_keys.iter().map(|k| self.range.entry_count(k)).sum(),
            composite_entries: self.composite.values().map(CompositeIndex::entry_count).sum(),
            composite_keys: self.composite.keys().cloned().collect(),
            exact_keys,
            range_keys,
        }
    }
}
