//! Property query engine
//!
//! Chooses between an index lookup and a full scan for a conjunction of
//! property predicates. Index legs are tried in this order:
//! 1. a composite index whose keys are all bound by exact predicates
//!    (the one covering the most keys wins)
//! 2. the exact-indexed predicate with the smallest bucket
//! 3. the range-indexed range predicate with the smallest estimated
//!    result; only that one is materialized and cached
//! 4. an exact predicate answered by a range index
//!
//! Every leg goes through the index cache. Candidates from the chosen leg
//! are re-checked against all predicates, so the result always equals a
//! brute-force filter.

use super::aggregate::{aggregate, Aggregation};
use super::predicate::PropertyPredicate;
use crate::graph::{Edge, Element, ElementId, ElementKind, Graph, PropertyValue, Vertex, VertexProperty};
use crate::index::{
    CacheKey, CacheParams, DefaultRangeMap, IdSet, IndexError, IndexKind, IndexManager, IndexResult, RangeMap,
};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// `(min, max, include_min, include_max)` of a range predicate
type RangeBounds<'p> = (Option<&'p PropertyValue>, Option<&'p PropertyValue>, bool, bool);

pub struct PropertyQueryEngine<'g, M = DefaultRangeMap> {
    graph: &'g Graph<M>,
}

impl<'g, M: RangeMap> PropertyQueryEngine<'g, M> {
    pub fn new(graph: &'g Graph<M>) -> Self {
        PropertyQueryEngine { graph }
    }

    /// Vertices matching `predicate`, in graph insertion order
    pub fn query_vertices(&self, predicate: &PropertyPredicate) -> Vec<&'g Vertex> {
        self.evaluate(ElementKind::Vertex, self.graph.vertex_map(), predicate)
    }

    /// Edges matching `predicate`, in graph insertion order
    pub fn query_edges(&self, predicate: &PropertyPredicate) -> Vec<&'g Edge> {
        self.evaluate(ElementKind::Edge, self.graph.edge_map(), predicate)
    }

    pub fn count_vertices(&self, predicate: &PropertyPredicate) -> usize {
        self.query_vertices(predicate).len()
    }

    pub fn count_edges(&self, predicate: &PropertyPredicate) -> usize {
        self.query_edges(predicate).len()
    }

    pub fn aggregate<'e, I>(&self, elements: I, key: &str, aggregation: Aggregation) -> PropertyValue
    where
        I: IntoIterator<Item = &'e dyn Element>,
    {
        aggregate(elements, key, aggregation)
    }

    pub fn query_vertex_properties<'e>(
        &self,
        element: &'e dyn Element,
        predicate: &PropertyPredicate,
    ) -> Vec<&'e VertexProperty> {
        query_vertex_properties(element, predicate)
    }

    fn evaluate<E: Element>(
        &self,
        kind: ElementKind,
        elements: &'g IndexMap<ElementId, E>,
        predicate: &PropertyPredicate,
    ) -> Vec<&'g E> {
        let metrics = self.graph.engine_metrics();
        metrics.record_query();
        let conjuncts = predicate.conjuncts();

        let candidates = match self.graph.indices().manager(kind) {
            Ok(manager) => self.index_candidates(kind, manager, &conjuncts),
            Err(_) => None,
        };
        match candidates {
            Some(ids) => {
                metrics.record_index_lookup();
                let mut hits: Vec<(usize, &'g E)> = ids
                    .iter()
                    .filter_map(|id| elements.get_full(id))
                    .map(|(pos, _, element)| (pos, element))
                    .filter(|(_, element)| conjuncts.iter().all(|p| p.matches(*element)))
                    .collect();
                hits.sort_unstable_by_key(|(pos, _)| *pos);
                hits.into_iter().map(|(_, element)| element).collect()
            }
            None => {
                metrics.record_full_scan();
                debug!(%kind, predicates = conjuncts.len(), "full scan");
                elements
                    .values()
                    .filter(|element| conjuncts.iter().all(|p| p.matches(*element)))
                    .collect()
            }
        }
    }

    /// Ids from the most selective usable index, or `None` when no index
    /// applies and the caller must scan.
    fn index_candidates(
        &self,
        kind: ElementKind,
        manager: &IndexManager<M>,
        conjuncts: &[&PropertyPredicate],
    ) -> Option<Arc<IdSet>> {
        let exacts: Vec<(&str, &PropertyValue)> = conjuncts
            .iter()
            .filter_map(|p| match p {
                PropertyPredicate::Exact { key, value } => Some((key.as_str(), value)),
                _ => None,
            })
            .collect();

        let composite = manager
            .composites()
            .filter_map(|index| {
                let values: Option<Vec<PropertyValue>> = index
                    .keys()
                    .iter()
                    .map(|k| exacts.iter().find(|(key, _)| key == k).map(|(_, v)| (*v).clone()))
                    .collect();
                values.map(|values| (index, values))
            })
            .max_by_key(|(index, _)| index.keys().len());
        if let Some((index, values)) = composite {
            debug!(%kind, keys = ?index.keys(), "composite index plan");
            let key = CacheKey::composite(kind, index.keys(), &values);
            return Some(self.cached(key, || Ok(index.get(&values))).unwrap_or_default());
        }

        let exact = manager.exact();
        let smallest = exacts
            .iter()
            .filter(|(key, _)| exact.has_index(key))
            .min_by_key(|(key, value)| exact.count(key, value));
        if let Some((key, value)) = smallest {
            debug!(%kind, key, "exact index plan");
            let cache_key = CacheKey::exact(kind, key, value);
            return Some(self.cached(cache_key, || Ok(exact.get(key, value))).unwrap_or_default());
        }

        let range = manager.range();
        let mut best: Option<(usize, &str, RangeBounds<'_>)> = None;
        for predicate in conjuncts {
            let PropertyPredicate::Range {
                key,
                min,
                max,
                include_min,
                include_max,
            } = predicate
            else {
                continue;
            };
            if !range.has_index(key) {
                continue;
            }
            let bounds = (min.as_ref(), max.as_ref(), *include_min, *include_max);
            match range.estimate(key, bounds.0, bounds.1, bounds.2, bounds.3) {
                Ok(size) => {
                    if best.as_ref().map_or(true, |(smallest, _, _)| size < *smallest) {
                        best = Some((size, key.as_str(), bounds));
                    }
                }
                Err(err) => {
                    // this conjunct matches nothing, so neither does the query
                    warn!(%kind, key = key.as_str(), error = %err, "range predicate degraded to empty result");
                    return Some(Arc::new(IdSet::default()));
                }
            }
        }
        if let Some((size, key, (min, max, include_min, include_max))) = best {
            debug!(%kind, key, estimate = size, "range index plan");
            let cache_key = CacheKey::range(kind, key, min, max, include_min, include_max);
            let lookup = self.cached(cache_key, || range.range_query(key, min, max, include_min, include_max));
            return Some(lookup.unwrap_or_else(|err| {
                warn!(%kind, key, error = %err, "range predicate degraded to empty result");
                Arc::new(IdSet::default())
            }));
        }

        let by_range = exacts
            .iter()
            .find(|(key, value)| range.has_index(key) && value.is_comparable());
        if let Some((key, value)) = by_range {
            debug!(%kind, key, "exact lookup on range index");
            let cache_key = CacheKey {
                kind: IndexKind::Range,
                element_kind: kind,
                keys: vec![key.to_string()],
                params: CacheParams::Exact((*value).clone()),
            };
            return Some(self.cached(cache_key, || Ok(range.exact_query(key, value))).unwrap_or_default());
        }

        None
    }

    /// Serve `key` from the cache, computing and storing it on a miss.
    /// Failed lookups are never cached.
    fn cached<F>(&self, key: CacheKey, compute: F) -> IndexResult<Arc<IdSet>>
    where
        F: FnOnce() -> Result<IdSet, IndexError>,
    {
        if let Some(ids) = self.graph.indices().cache().get(&key) {
            return Ok(ids);
        }
        let ids = compute()?;
        Ok(self.graph.indices().cache().put(key, ids))
    }
}

/// Vertex properties of `element` that individually satisfy `predicate`
pub fn query_vertex_properties<'e>(
    element: &'e dyn Element,
    predicate: &PropertyPredicate,
) -> Vec<&'e VertexProperty> {
    element
        .keys()
        .into_iter()
        .flat_map(move |key| element.vertex_properties(key).iter())
        .filter(|property| predicate.matches(*property))
        .collect()
}
