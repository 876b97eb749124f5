//! Ordered property index supporting interval queries
//!
//! Each indexed key owns an ordered map from [`RangeKey`] to the ids holding
//! that value. Values are ordered within their family (booleans, numbers,
//! datetimes, strings); a query bound selects one family and never leaks
//! into another. Values with no family (arrays, maps, null, NaN) are skipped
//! silently.

use super::{IdSet, IndexError, IndexResult};
use crate::graph::property::cmp_i64_f64;
use crate::graph::{Element, ElementId, PropertyValue, ValueFamily};
use crate::platform::OrderedMap;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

/// Numeric component of a [`RangeKey`]; floats are never NaN.
///
/// Ordered numerically; values that are numerically equal are tie-broken
/// integer first, then by float sign (-0.0 before 0.0), so distinct stored
/// values never share a key.
#[derive(Debug, Clone, Copy)]
pub enum NumberKey {
    Int(i64),
    Float(f64),
}

impl NumberKey {
    /// Smallest key numerically equal to `self`
    fn min_tie(self) -> NumberKey {
        match self {
            NumberKey::Int(_) => self,
            NumberKey::Float(f) => {
                let whole = f as i64;
                if f.fract() == 0.0 && cmp_i64_f64(whole, f) == Ordering::Equal {
                    NumberKey::Int(whole)
                } else {
                    self
                }
            }
        }
    }

    /// Largest key numerically equal to `self`
    fn max_tie(self) -> NumberKey {
        match self {
            NumberKey::Float(f) if f == 0.0 => NumberKey::Float(0.0),
            NumberKey::Float(_) => self,
            NumberKey::Int(i) => {
                let f = i as f64;
                if cmp_i64_f64(i, f) == Ordering::Equal {
                    NumberKey::Float(if f == 0.0 { 0.0 } else { f })
                } else {
                    self
                }
            }
        }
    }
}

impl Ord for NumberKey {
    fn cmp(&self, other: &Self) -> Ordering {
        use NumberKey::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => cmp_i64_f64(*a, *b).then(Ordering::Less),
            (Float(a), Int(b)) => cmp_i64_f64(*b, *a).reverse().then(Ordering::Greater),
        }
    }
}

impl PartialOrd for NumberKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NumberKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NumberKey {}

/// Totally ordered form of a comparable [`PropertyValue`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RangeKey {
    Boolean(bool),
    Number(NumberKey),
    DateTime(i64),
    String(String),
}

impl RangeKey {
    /// `None` for values that cannot be ordered
    pub fn from_value(value: &PropertyValue) -> Option<RangeKey> {
        match value {
            PropertyValue::Boolean(b) => Some(RangeKey::Boolean(*b)),
            PropertyValue::Integer(i) => Some(RangeKey::Number(NumberKey::Int(*i))),
            PropertyValue::Float(f) if !f.is_nan() => Some(RangeKey::Number(NumberKey::Float(*f))),
            PropertyValue::DateTime(dt) => Some(RangeKey::DateTime(*dt)),
            PropertyValue::String(s) => Some(RangeKey::String(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> PropertyValue {
        match self {
            RangeKey::Boolean(b) => PropertyValue::Boolean(*b),
            RangeKey::Number(NumberKey::Int(i)) => PropertyValue::Integer(*i),
            RangeKey::Number(NumberKey::Float(f)) => PropertyValue::Float(*f),
            RangeKey::DateTime(dt) => PropertyValue::DateTime(*dt),
            RangeKey::String(s) => PropertyValue::String(s.clone()),
        }
    }

    pub fn family(&self) -> ValueFamily {
        match self {
            RangeKey::Boolean(_) => ValueFamily::Boolean,
            RangeKey::Number(_) => ValueFamily::Number,
            RangeKey::DateTime(_) => ValueFamily::DateTime,
            RangeKey::String(_) => ValueFamily::String,
        }
    }

    fn min_tie(&self) -> RangeKey {
        match self {
            RangeKey::Number(n) => RangeKey::Number(n.min_tie()),
            other => other.clone(),
        }
    }

    fn max_tie(&self) -> RangeKey {
        match self {
            RangeKey::Number(n) => RangeKey::Number(n.max_tie()),
            other => other.clone(),
        }
    }

    fn family_start(family: ValueFamily) -> Bound<RangeKey> {
        Bound::Included(match family {
            ValueFamily::Boolean => RangeKey::Boolean(false),
            ValueFamily::Number => RangeKey::Number(NumberKey::Float(f64::NEG_INFINITY)),
            ValueFamily::DateTime => RangeKey::DateTime(i64::MIN),
            ValueFamily::String => RangeKey::String(String::new()),
        })
    }

    fn family_end(family: ValueFamily) -> Bound<RangeKey> {
        match family {
            ValueFamily::Boolean => Bound::Included(RangeKey::Boolean(true)),
            ValueFamily::Number => Bound::Included(RangeKey::Number(NumberKey::Float(f64::INFINITY))),
            ValueFamily::DateTime => Bound::Included(RangeKey::DateTime(i64::MAX)),
            // strings sort last, nothing follows them
            ValueFamily::String => Bound::Unbounded,
        }
    }
}

/// Any ordered map usable as the per-key storage of a [`RangeIndex`]
pub trait RangeMap: OrderedMap<RangeKey, IdSet> {}

impl<M: OrderedMap<RangeKey, IdSet>> RangeMap for M {}

pub type DefaultRangeMap = BTreeMap<RangeKey, IdSet>;

#[derive(Debug)]
pub struct RangeIndex<M = DefaultRangeMap> {
    indices: FxHashMap<String, M>,
}

impl RangeIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: RangeMap> Default for RangeIndex<M> {
    fn default() -> Self {
        RangeIndex {
            indices: FxHashMap::default(),
        }
    }
}

impl<M: RangeMap> RangeIndex<M> {
    /// Start indexing `key`. Returns false if it was already indexed.
    pub fn create_index(&mut self, key: &str) -> bool {
        if self.indices.contains_key(key) {
            return false;
        }
        self.indices.insert(key.to_string(), M::default());
        true
    }

    pub fn drop_index(&mut self, key: &str) -> bool {
        self.indices.remove(key).is_some()
    }

    pub fn has_index(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    pub fn indexed_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.indices.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// The single mutation entrypoint: move `id` out of the bucket for `old`
    /// (pruning it when empty) and into the bucket for `new`. Either leg is
    /// skipped when its value is absent or not comparable.
    pub fn auto_update(
        &mut self,
        key: &str,
        new: Option<&PropertyValue>,
        old: Option<&PropertyValue>,
        id: &ElementId,
    ) {
        let Some(map) = self.indices.get_mut(key) else {
            return;
        };
        if let Some(old_key) = old.and_then(RangeKey::from_value) {
            remove_from(map, &old_key, id);
        }
        if let Some(new_key) = new.and_then(RangeKey::from_value) {
            map.get_or_insert_default(new_key).insert(id.clone());
        }
    }

    /// Union of the ids of every stored value inside the requested bounds.
    ///
    /// An absent bound is open on that side within the other bound's family;
    /// with both absent every indexed id is returned. Bounds that are not
    /// comparable (or of different families) are rejected.
    pub fn range_query(
        &self,
        key: &str,
        min: Option<&PropertyValue>,
        max: Option<&PropertyValue>,
        include_min: bool,
        include_max: bool,
    ) -> IndexResult<IdSet> {
        let map = self
            .indices
            .get(key)
            .ok_or_else(|| IndexError::PropertyNotFound(key.to_string()))?;
        let mut result = IdSet::default();
        match resolve_bounds(min, max, include_min, include_max)? {
            ScanBounds::All => {
                for (_, ids) in map.iter() {
                    result.extend(ids.iter().cloned());
                }
            }
            ScanBounds::Empty => {}
            ScanBounds::Range(lower, upper) => {
                for (_, ids) in map.range(lower.as_ref(), upper.as_ref()) {
                    result.extend(ids.iter().cloned());
                }
            }
        }
        Ok(result)
    }

    /// Sum of the bucket sizes inside the bounds, without building the id
    /// set. An upper bound on `range_query(..).len()`; exact when every
    /// element holds at most one value under `key`.
    pub fn estimate(
        &self,
        key: &str,
        min: Option<&PropertyValue>,
        max: Option<&PropertyValue>,
        include_min: bool,
        include_max: bool,
    ) -> IndexResult<usize> {
        let map = self
            .indices
            .get(key)
            .ok_or_else(|| IndexError::PropertyNotFound(key.to_string()))?;
        let total = match resolve_bounds(min, max, include_min, include_max)? {
            ScanBounds::All => map.iter().map(|(_, ids)| ids.len()).sum(),
            ScanBounds::Empty => 0,
            ScanBounds::Range(lower, upper) => map
                .range(lower.as_ref(), upper.as_ref())
                .map(|(_, ids)| ids.len())
                .sum(),
        };
        Ok(total)
    }

    /// Ids whose value is exactly `value` (empty for non-comparable values)
    pub fn exact_query(&self, key: &str, value: &PropertyValue) -> IdSet {
        RangeKey::from_value(value)
            .and_then(|k| self.indices.get(key)?.get(&k).cloned())
            .unwrap_or_default()
    }

    pub fn greater_than(&self, key: &str, value: &PropertyValue, inclusive: bool) -> IndexResult<IdSet> {
        self.range_query(key, Some(value), None, inclusive, false)
    }

    pub fn less_than(&self, key: &str, value: &PropertyValue, inclusive: bool) -> IndexResult<IdSet> {
        self.range_query(key, None, Some(value), false, inclusive)
    }

    pub fn min_value(&self, key: &str) -> Option<PropertyValue> {
        self.indices.get(key)?.first().map(|(k, _)| k.to_value())
    }

    pub fn max_value(&self, key: &str) -> Option<PropertyValue> {
        self.indices.get(key)?.last().map(|(k, _)| k.to_value())
    }

    /// Distinct indexed values in ascending order
    pub fn sorted_values(&self, key: &str) -> Vec<PropertyValue> {
        self.indices
            .get(key)
            .map(|map| map.iter().map(|(k, _)| k.to_value()).collect())
            .unwrap_or_default()
    }

    /// Number of distinct elements inside the bounds
    pub fn count_in_range(
        &self,
        key: &str,
        min: Option<&PropertyValue>,
        max: Option<&PropertyValue>,
        include_min: bool,
        include_max: bool,
    ) -> IndexResult<usize> {
        Ok(self.range_query(key, min, max, include_min, include_max)?.len())
    }

    pub fn index_element(&mut self, element: &dyn Element) {
        for (key, map) in self.indices.iter_mut() {
            for value in element.values(key) {
                if let Some(k) = RangeKey::from_value(value) {
                    map.get_or_insert_default(k).insert(element.id().clone());
                }
            }
        }
    }

    pub fn unindex_element(&mut self, element: &dyn Element) {
        for (key, map) in self.indices.iter_mut() {
            for value in element.values(key) {
                if let Some(k) = RangeKey::from_value(value) {
                    remove_from(map, &k, element.id());
                }
            }
        }
    }

    /// Clear `key` and rescan `elements`; produces the same buckets as
    /// auto-updating each element individually.
    pub fn rebuild<'a, E, I>(&mut self, key: &str, elements: I)
    where
        E: Element + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let Some(map) = self.indices.get_mut(key) else {
            return;
        };
        map.clear();
        for element in elements {
            for value in element.values(key) {
                if let Some(k) = RangeKey::from_value(value) {
                    map.get_or_insert_default(k).insert(element.id().clone());
                }
            }
        }
        debug!(key, distinct_values = map.len(), "rebuilt range index");
    }

    pub fn clear_entries(&mut self) {
        for map in self.indices.values_mut() {
            map.clear();
        }
    }

    pub fn distinct_values(&self, key: &str) -> usize {
        self.indices.get(key).map_or(0, |map| map.len())
    }

    pub fn entry_count(&self, key: &str) -> usize {
        self.indices
            .get(key)
            .map_or(0, |map| map.iter().map(|(_, ids)| ids.len()).sum())
    }

    /// Ids per value in ascending order
    pub fn buckets(&self, key: &str) -> Vec<(PropertyValue, IdSet)> {
        self.indices
            .get(key)
            .map(|map| map.iter().map(|(k, ids)| (k.to_value(), ids.clone())).collect())
            .unwrap_or_default()
    }
}

fn remove_from<M: RangeMap>(map: &mut M, key: &RangeKey, id: &ElementId) {
    let emptied = match map.get_mut(key) {
        Some(ids) => {
            ids.remove(id);
            ids.is_empty()
        }
        None => false,
    };
    if emptied {
        map.remove(key);
    }
}

enum ScanBounds {
    All,
    Empty,
    Range(Bound<RangeKey>, Bound<RangeKey>),
}

fn resolve_bounds(
    min: Option<&PropertyValue>,
    max: Option<&PropertyValue>,
    include_min: bool,
    include_max: bool,
) -> IndexResult<ScanBounds> {
    let to_key = |value: &PropertyValue| {
        RangeKey::from_value(value).ok_or_else(|| IndexError::NonComparableValue(value.to_string()))
    };
    let min_key = min.map(to_key).transpose()?;
    let max_key = max.map(to_key).transpose()?;

    let family = match (&min_key, &max_key) {
        (None, None) => return Ok(ScanBounds::All),
        (Some(lo), Some(hi)) => {
            if lo.family() != hi.family() {
                return Err(IndexError::NonComparableValue(format!(
                    "{} .. {}",
                    lo.to_value(),
                    hi.to_value()
                )));
            }
            match lo.to_value().compare(&hi.to_value()) {
                Some(Ordering::Greater) => return Ok(ScanBounds::Empty),
                Some(Ordering::Equal) if !(include_min && include_max) => return Ok(ScanBounds::Empty),
                _ => {}
            }
            lo.family()
        }
        (Some(k), None) | (None, Some(k)) => k.family(),
    };

    let lower = match &min_key {
        Some(k) if include_min => Bound::Included(k.min_tie()),
        Some(k) => Bound::Excluded(k.max_tie()),
        None => RangeKey::family_start(family),
    };
    let upper = match &max_key {
        Some(k) if include_max => Bound::Included(k.max_tie()),
        Some(k) => Bound::Excluded(k.min_tie()),
        None => RangeKey::family_end(family),
    };
    Ok(ScanBounds::Range(lower, upper))
}
