//! Composite (multi-key) exact-match index
//!
//! Keyed by an ordered tuple of values, one per indexed key. An element is
//! indexed only when it holds every key; multi-valued vertex keys contribute
//! every combination of their values. The index remembers the tuples it
//! stored per element so an update never needs the element's previous state.

use super::{IdSet, IndexError, IndexResult};
use crate::graph::{Element, ElementId, PropertyValue};
use rustc_hash::{FxHashMap, FxHashSet};

type Tuple = Vec<PropertyValue>;

#[derive(Debug, Clone)]
pub struct CompositeIndex {
    keys: Vec<String>,
    buckets: FxHashMap<Tuple, IdSet>,
    tuples: FxHashMap<ElementId, Vec<Tuple>>,
}

impl CompositeIndex {
    pub fn new(keys: Vec<String>) -> IndexResult<Self> {
        if keys.is_empty() {
            return Err(IndexError::EmptyCompositeKeyList);
        }
        Ok(CompositeIndex {
            keys,
            buckets: FxHashMap::default(),
            tuples: FxHashMap::default(),
        })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn covers(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Every value tuple `element` currently contributes
    pub fn tuples_of(&self, element: &dyn Element) -> Vec<Tuple> {
        let mut tuples: Vec<Tuple> = vec![Vec::with_capacity(self.keys.len())];
        for key in &self.keys {
            let values = element.values(key);
            if values.is_empty() {
                return Vec::new();
            }
            tuples = tuples
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |value| {
                        let mut tuple = prefix.clone();
                        tuple.push((*value).clone());
                        tuple
                    })
                })
                .collect();
        }
        let mut seen = FxHashSet::default();
        tuples.retain(|tuple| seen.insert(tuple.clone()));
        tuples
    }

    /// Re-derive the tuples of `element` and move it between buckets
    pub fn update_element(&mut self, element: &dyn Element) {
        let id = element.id();
        self.remove_element(id);
        let tuples = self.tuples_of(element);
        if tuples.is_empty() {
            return;
        }
        for tuple in &tuples {
            self.buckets.entry(tuple.clone()).or_default().insert(id.clone());
        }
        self.tuples.insert(id.clone(), tuples);
    }

    pub fn remove_element(&mut self, id: &ElementId) {
        let Some(old) = self.tuples.remove(id) else {
            return;
        };
        for tuple in old {
            if let Some(ids) = self.buckets.get_mut(&tuple) {
                ids.remove(id);
                if ids.is_empty() {
                    self.buckets.remove(&tuple);
                }
            }
        }
    }

    pub fn bucket(&self, values: &[PropertyValue]) -> Option<&IdSet> {
        self.buckets.get(values)
    }

    /// Ids whose values for the indexed keys equal `values` component-wise.
    /// A tuple of the wrong arity matches nothing.
    pub fn get(&self, values: &[PropertyValue]) -> IdSet {
        if values.len() != self.keys.len() {
            return IdSet::default();
        }
        self.bucket(values).cloned().unwrap_or_default()
    }

    pub fn count(&self, values: &[PropertyValue]) -> usize {
        self.bucket(values).map_or(0, IdSet::len)
    }

    pub fn rebuild<'a, E, I>(&mut self, elements: I)
    where
        E: Element + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        self.clear_entries();
        for element in elements {
            self.update_element(element);
        }
    }

    pub fn clear_entries(&mut self) {
        self.buckets.clear();
        self.tuples.clear();
    }

    pub fn distinct_tuples(&self) -> usize {
        self.buckets.len()
    }

    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(IdSet::len).sum()
    }

    /// Snapshot of every tuple bucket
    pub fn buckets(&self) -> FxHashMap<Tuple, IdSet> {
        self.buckets.clone()
    }
}
