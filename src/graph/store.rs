//! In-memory graph storage implementation
//!
//! [`Graph`] owns every vertex and edge and is the only component that
//! mutates them. Each mutation is reported to the index layer as an
//! [`IndexEvent`] before the call returns, so exact, composite and range
//! indices (and the lookup cache) always reflect the current elements.

use super::config::GraphConfig;
use super::edge::Edge;
use super::element::Element;
use super::event::{GraphIndices, IndexEvent};
use super::features::Features;
use super::id::IdGenerator;
use super::property::PropertyValue;
use super::types::{Cardinality, Direction, ElementId, ElementKind, Label};
use super::vertex::{Vertex, VertexProperty};
use crate::index::{
    CacheStatistics, DefaultRangeMap, IndexCache, IndexError, IndexKind, IndexManager, IndexStatistics, RangeMap,
};
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::platform::{Clock, MonotonicClock};
use crate::query::{Aggregation, PropertyPredicate, PropertyQueryEngine};
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    VertexNotFound(ElementId),

    #[error("Edge {0} not found")]
    EdgeNotFound(ElementId),

    #[error("Vertex property {0} not found")]
    VertexPropertyNotFound(ElementId),

    #[error("Element with id {0} already exists")]
    DuplicateIdentifier(ElementId),

    #[error("Null value for property {0} is not allowed")]
    NullPropertyRejected(String),

    #[error("Invalid identifier {0}")]
    InvalidIdentifier(String),

    #[error("No {0} ids left to generate")]
    IdSpaceExhausted(ElementKind),

    #[error("Invalid property key {0:?}")]
    InvalidPropertyKey(String),

    #[error("Graph is closed")]
    GraphClosed,

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Vertex or edge counts plus index and cache state
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GraphStatistics {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub vertex_property_count: usize,
    pub vertex_indices: IndexStatistics,
    pub edge_indices: IndexStatistics,
    pub cache: CacheStatistics,
}

/// Outcome of writing one vertex property value
struct PropertyWrite {
    id: ElementId,
    /// Values the vertex no longer holds under the key
    removed: Vec<PropertyValue>,
    inserted: bool,
}

/// In-memory property graph
///
/// Storage layout:
/// - vertices: ElementId -> Vertex (properties and adjacency live on the vertex)
/// - edges: ElementId -> Edge
/// - indices: exact/composite/range per element kind, plus the lookup cache
///
/// Mutations take `&mut self`; queries take `&self` and may run concurrently.
#[derive(Debug)]
pub struct Graph<M = DefaultRangeMap> {
    config: GraphConfig,
    vertex_ids: IdGenerator,
    edge_ids: IdGenerator,
    property_ids: IdGenerator,
    vertices: IndexMap<ElementId, Vertex>,
    edges: IndexMap<ElementId, Edge>,
    indices: GraphIndices<M>,
    metrics: Arc<EngineMetrics>,
    clock: Arc<dyn Clock>,
    closed: bool,
}

impl Graph {
    /// Create an empty graph with the default configuration
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self::with_runtime(config, Arc::new(MonotonicClock::new()))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RangeMap> Graph<M> {
    /// Create an empty graph using `clock` for cache ageing and `M` as the
    /// range index storage.
    pub fn with_runtime(config: GraphConfig, clock: Arc<dyn Clock>) -> Self {
        let metrics = Arc::new(EngineMetrics::new());
        let cache = IndexCache::new(Arc::clone(&clock), config.cache_max_size, config.cache_max_age_ms);
        Graph {
            vertex_ids: IdGenerator::new(config.vertex_id_manager),
            edge_ids: IdGenerator::new(config.edge_id_manager),
            property_ids: IdGenerator::new(config.vertex_property_id_manager),
            vertices: IndexMap::new(),
            edges: IndexMap::new(),
            indices: GraphIndices::new(cache, Arc::clone(&metrics)),
            metrics,
            clock,
            config,
            closed: false,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn features(&self) -> Features {
        Features::from_config(&self.config)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn ensure_open(&self) -> GraphResult<()> {
        if self.closed {
            return Err(GraphError::GraphClosed);
        }
        Ok(())
    }

    fn check_property(&self, key: &str, value: &PropertyValue) -> GraphResult<()> {
        if key.is_empty() {
            return Err(GraphError::InvalidPropertyKey(key.to_string()));
        }
        if value.is_null() && !self.config.allow_null_property_values {
            return Err(GraphError::NullPropertyRejected(key.to_string()));
        }
        Ok(())
    }

    fn check_properties(&self, properties: &[(String, PropertyValue)]) -> GraphResult<()> {
        for (key, value) in properties {
            self.check_property(key, value)?;
        }
        Ok(())
    }

    // ============================================================
    // Vertices
    // ============================================================

    /// Add a vertex with a generated id
    pub fn add_vertex(&mut self, label: impl Into<Label>) -> GraphResult<ElementId> {
        self.insert_vertex(None, label.into(), Vec::new())
    }

    /// Add a vertex with a generated id and initial properties, written in
    /// order with the default cardinality
    pub fn add_vertex_with_properties<K, I>(&mut self, label: impl Into<Label>, properties: I) -> GraphResult<ElementId>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PropertyValue)>,
    {
        let properties = properties.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.insert_vertex(None, label.into(), properties)
    }

    /// Add a vertex with a user-supplied id, converted by the vertex id manager
    pub fn add_vertex_with_id<K, I>(
        &mut self,
        id: impl Into<PropertyValue>,
        label: impl Into<Label>,
        properties: I,
    ) -> GraphResult<ElementId>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PropertyValue)>,
    {
        let properties = properties.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.insert_vertex(Some(id.into()), label.into(), properties)
    }

    fn insert_vertex(
        &mut self,
        supplied: Option<PropertyValue>,
        label: Label,
        properties: Vec<(String, PropertyValue)>,
    ) -> GraphResult<ElementId> {
        self.ensure_open()?;
        self.check_properties(&properties)?;
        let id = match supplied {
            Some(raw) => {
                let id = self
                    .vertex_ids
                    .manager()
                    .convert(&raw)
                    .ok_or_else(|| GraphError::InvalidIdentifier(raw.to_string()))?;
                if self.vertices.contains_key(&id) {
                    return Err(GraphError::DuplicateIdentifier(id));
                }
                self.vertex_ids.observe(&id);
                id
            }
            None => {
                let vertices = &self.vertices;
                self.vertex_ids
                    .next_id(|id| vertices.contains_key(id))
                    .ok_or(GraphError::IdSpaceExhausted(ElementKind::Vertex))?
            }
        };

        let mut vertex = Vertex::new(id.clone(), label);
        let cardinality = self.config.default_vertex_property_cardinality;
        for (key, value) in properties {
            write_vertex_property(&mut vertex, &mut self.property_ids, &key, value, cardinality)?;
        }
        self.vertices.insert(id.clone(), vertex);
        if let Some(vertex) = self.vertices.get(&id) {
            self.indices.handle_index_event(IndexEvent::ElementAdded { element: vertex });
        }
        self.metrics.record_vertex_added();
        debug!(%id, "added vertex");
        Ok(id)
    }

    pub fn vertex(&self, id: &ElementId) -> GraphResult<&Vertex> {
        self.ensure_open()?;
        self.vertices
            .get(id)
            .ok_or_else(|| GraphError::VertexNotFound(id.clone()))
    }

    pub fn contains_vertex(&self, id: &ElementId) -> bool {
        self.vertices.contains_key(id)
    }

    /// All vertices; empty once the graph is closed
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Remove a vertex together with every incident edge
    pub fn remove_vertex(&mut self, id: &ElementId) -> GraphResult<Vertex> {
        self.ensure_open()?;
        let vertex = self
            .vertices
            .get(id)
            .ok_or_else(|| GraphError::VertexNotFound(id.clone()))?;
        let mut incident: Vec<ElementId> = vertex
            .edge_ids(Direction::Both, &[])
            .into_iter()
            .cloned()
            .collect();
        incident.sort();
        incident.dedup();
        for edge_id in &incident {
            self.detach_edge(edge_id);
        }

        let vertex = self
            .vertices
            .swap_remove(id)
            .ok_or_else(|| GraphError::VertexNotFound(id.clone()))?;
        self.indices.handle_index_event(IndexEvent::ElementRemoved { element: &vertex });
        self.metrics.record_vertex_removed();
        debug!(%id, edges = incident.len(), "removed vertex");
        Ok(vertex)
    }

    // ============================================================
    // Vertex properties
    // ============================================================

    /// Write `value` under `key` with the configured default cardinality.
    /// Returns the id of the vertex property holding the value.
    pub fn set_vertex_property(
        &mut self,
        id: &ElementId,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<ElementId> {
        let cardinality = self.config.default_vertex_property_cardinality;
        self.set_vertex_property_with_cardinality(id, key, value, cardinality)
    }

    /// Write `value` under `key`:
    /// - `Single` replaces every existing value
    /// - `List` appends, keeping duplicates
    /// - `Set` appends only when the value is not already present
    pub fn set_vertex_property_with_cardinality(
        &mut self,
        id: &ElementId,
        key: &str,
        value: impl Into<PropertyValue>,
        cardinality: Cardinality,
    ) -> GraphResult<ElementId> {
        self.ensure_open()?;
        let value = value.into();
        self.check_property(key, &value)?;
        let vertex = self
            .vertices
            .get_mut(id)
            .ok_or_else(|| GraphError::VertexNotFound(id.clone()))?;
        let write = write_vertex_property(vertex, &mut self.property_ids, key, value.clone(), cardinality)?;
        self.metrics.record_property_write();

        if let Some(vertex) = self.vertices.get(id) {
            for old in &write.removed {
                self.indices.handle_index_event(IndexEvent::PropertyChanged {
                    element: vertex,
                    key,
                    old_value: Some(old),
                    new_value: None,
                });
            }
            if write.inserted {
                self.indices.handle_index_event(IndexEvent::PropertyChanged {
                    element: vertex,
                    key,
                    old_value: None,
                    new_value: Some(&value),
                });
            }
        }
        Ok(write.id)
    }

    /// Remove every value under `key`, returning the removed properties
    pub fn remove_vertex_property(&mut self, id: &ElementId, key: &str) -> GraphResult<Vec<VertexProperty>> {
        self.ensure_open()?;
        let vertex = self
            .vertices
            .get_mut(id)
            .ok_or_else(|| GraphError::VertexNotFound(id.clone()))?;
        let removed = vertex.take_properties(key);
        if removed.is_empty() {
            return Ok(removed);
        }
        self.metrics.record_property_write();

        let mut distinct: Vec<&PropertyValue> = Vec::new();
        for property in &removed {
            if !distinct.contains(&property.value()) {
                distinct.push(property.value());
            }
        }
        if let Some(vertex) = self.vertices.get(id) {
            for old in distinct {
                self.indices.handle_index_event(IndexEvent::PropertyChanged {
                    element: vertex,
                    key,
                    old_value: Some(old),
                    new_value: None,
                });
            }
        }
        Ok(removed)
    }

    /// Remove a single vertex property by its own id
    pub fn remove_vertex_property_value(
        &mut self,
        vertex_id: &ElementId,
        property_id: &ElementId,
    ) -> GraphResult<VertexProperty> {
        self.ensure_open()?;
        let vertex = self
            .vertices
            .get_mut(vertex_id)
            .ok_or_else(|| GraphError::VertexNotFound(vertex_id.clone()))?;
        let removed = vertex
            .remove_property_by_id(property_id)
            .ok_or_else(|| GraphError::VertexPropertyNotFound(property_id.clone()))?;
        self.metrics.record_property_write();

        if let Some(vertex) = self.vertices.get(vertex_id) {
            // a duplicate LIST value keeps the vertex in its bucket
            let still_held = vertex.values(removed.key()).contains(&removed.value());
            if !still_held {
                self.indices.handle_index_event(IndexEvent::PropertyChanged {
                    element: vertex,
                    key: removed.key(),
                    old_value: Some(removed.value()),
                    new_value: None,
                });
            }
        }
        Ok(removed)
    }

    /// Attach a meta-property to one vertex property. Returns the previous
    /// meta value.
    pub fn set_meta_property(
        &mut self,
        vertex_id: &ElementId,
        property_id: &ElementId,
        meta_key: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<Option<PropertyValue>> {
        self.ensure_open()?;
        let value = value.into();
        self.check_property(meta_key, &value)?;
        let property = self.vertex_property_mut(vertex_id, property_id)?;
        let previous = property.set_meta(meta_key.to_string(), value);
        self.metrics.record_property_write();
        Ok(previous)
    }

    pub fn remove_meta_property(
        &mut self,
        vertex_id: &ElementId,
        property_id: &ElementId,
        meta_key: &str,
    ) -> GraphResult<Option<PropertyValue>> {
        self.ensure_open()?;
        let property = self.vertex_property_mut(vertex_id, property_id)?;
        let removed = property.remove_meta(meta_key);
        if removed.is_some() {
            self.metrics.record_property_write();
        }
        Ok(removed)
    }

    fn vertex_property_mut(
        &mut self,
        vertex_id: &ElementId,
        property_id: &ElementId,
    ) -> GraphResult<&mut VertexProperty> {
        self.vertices
            .get_mut(vertex_id)
            .ok_or_else(|| GraphError::VertexNotFound(vertex_id.clone()))?
            .vertex_property_mut(property_id)
            .ok_or_else(|| GraphError::VertexPropertyNotFound(property_id.clone()))
    }

    // ============================================================
    // Edges
    // ============================================================

    /// Add an edge with a generated id from `out_vertex` to `in_vertex`
    pub fn add_edge(
        &mut self,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: impl Into<Label>,
    ) -> GraphResult<ElementId> {
        self.insert_edge(None, out_vertex, in_vertex, label.into(), Vec::new())
    }

    pub fn add_edge_with_properties<K, I>(
        &mut self,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: impl Into<Label>,
        properties: I,
    ) -> GraphResult<ElementId>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PropertyValue)>,
    {
        let properties = properties.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.insert_edge(None, out_vertex, in_vertex, label.into(), properties)
    }

    pub fn add_edge_with_id<K, I>(
        &mut self,
        id: impl Into<PropertyValue>,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: impl Into<Label>,
        properties: I,
    ) -> GraphResult<ElementId>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PropertyValue)>,
    {
        let properties = properties.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.insert_edge(Some(id.into()), out_vertex, in_vertex, label.into(), properties)
    }

    fn insert_edge(
        &mut self,
        supplied: Option<PropertyValue>,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: Label,
        properties: Vec<(String, PropertyValue)>,
    ) -> GraphResult<ElementId> {
        self.ensure_open()?;
        self.check_properties(&properties)?;
        for endpoint in [out_vertex, in_vertex] {
            if !self.vertices.contains_key(endpoint) {
                return Err(GraphError::VertexNotFound(endpoint.clone()));
            }
        }
        let id = match supplied {
            Some(raw) => {
                let id = self
                    .edge_ids
                    .manager()
                    .convert(&raw)
                    .ok_or_else(|| GraphError::InvalidIdentifier(raw.to_string()))?;
                if self.edges.contains_key(&id) {
                    return Err(GraphError::DuplicateIdentifier(id));
                }
                self.edge_ids.observe(&id);
                id
            }
            None => {
                let edges = &self.edges;
                self.edge_ids
                    .next_id(|id| edges.contains_key(id))
                    .ok_or(GraphError::IdSpaceExhausted(ElementKind::Edge))?
            }
        };

        let mut edge = Edge::new(id.clone(), out_vertex.clone(), in_vertex.clone(), label);
        for (key, value) in properties {
            edge.set_property(key, value);
        }
        if let Some(vertex) = self.vertices.get_mut(out_vertex) {
            vertex.add_out_edge(edge.label(), id.clone());
        }
        if let Some(vertex) = self.vertices.get_mut(in_vertex) {
            vertex.add_in_edge(edge.label(), id.clone());
        }
        self.edges.insert(id.clone(), edge);
        if let Some(edge) = self.edges.get(&id) {
            self.indices.handle_index_event(IndexEvent::ElementAdded { element: edge });
        }
        self.metrics.record_edge_added();
        debug!(%id, %out_vertex, %in_vertex, "added edge");
        Ok(id)
    }

    pub fn edge(&self, id: &ElementId) -> GraphResult<&Edge> {
        self.ensure_open()?;
        self.edges
            .get(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))
    }

    pub fn contains_edge(&self, id: &ElementId) -> bool {
        self.edges.contains_key(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Set a single-valued edge property, returning the previous value
    pub fn set_edge_property(
        &mut self,
        id: &ElementId,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<Option<PropertyValue>> {
        self.ensure_open()?;
        let value = value.into();
        self.check_property(key, &value)?;
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        let previous = edge.set_property(key.to_string(), value.clone());
        self.metrics.record_property_write();

        if let Some(edge) = self.edges.get(id) {
            self.indices.handle_index_event(IndexEvent::PropertyChanged {
                element: edge,
                key,
                old_value: previous.as_ref().filter(|old| **old != value),
                new_value: Some(&value),
            });
        }
        Ok(previous)
    }

    pub fn remove_edge_property(&mut self, id: &ElementId, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.ensure_open()?;
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        let removed = edge.remove_property(key);
        if let (Some(old), Some(edge)) = (removed.as_ref(), self.edges.get(id)) {
            self.metrics.record_property_write();
            self.indices.handle_index_event(IndexEvent::PropertyChanged {
                element: edge,
                key,
                old_value: Some(old),
                new_value: None,
            });
        }
        Ok(removed)
    }

    pub fn remove_edge(&mut self, id: &ElementId) -> GraphResult<Edge> {
        self.ensure_open()?;
        self.detach_edge(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))
    }

    fn detach_edge(&mut self, id: &ElementId) -> Option<Edge> {
        let edge = self.edges.swap_remove(id)?;
        if let Some(vertex) = self.vertices.get_mut(edge.out_vertex()) {
            vertex.remove_out_edge(edge.label(), edge.id());
        }
        if let Some(vertex) = self.vertices.get_mut(edge.in_vertex()) {
            vertex.remove_in_edge(edge.label(), edge.id());
        }
        self.indices.handle_index_event(IndexEvent::ElementRemoved { element: &edge });
        self.metrics.record_edge_removed();
        debug!(%id, "removed edge");
        Some(edge)
    }

    // ============================================================
    // Adjacency
    // ============================================================

    /// Edges incident to `vertex` in `direction`, optionally restricted to
    /// `labels` (empty means all). A self-loop appears once per matching
    /// direction.
    pub fn adjacent_edges(
        &self,
        vertex: &ElementId,
        direction: Direction,
        labels: &[&str],
    ) -> GraphResult<Vec<&Edge>> {
        let vertex = self.vertex(vertex)?;
        Ok(vertex
            .edge_ids(direction, labels)
            .into_iter()
            .filter_map(|id| self.edges.get(id))
            .collect())
    }

    /// Vertices on the other end of the edges returned by [`Self::adjacent_edges`]
    pub fn adjacent_vertices(
        &self,
        vertex: &ElementId,
        direction: Direction,
        labels: &[&str],
    ) -> GraphResult<Vec<&Vertex>> {
        let vertex = self.vertex(vertex)?;
        let mut adjacent = Vec::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            for id in vertex.edge_ids(Direction::Out, labels) {
                if let Some(other) = self.edges.get(id).and_then(|e| self.vertices.get(e.in_vertex())) {
                    adjacent.push(other);
                }
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            for id in vertex.edge_ids(Direction::In, labels) {
                if let Some(other) = self.edges.get(id).and_then(|e| self.vertices.get(e.out_vertex())) {
                    adjacent.push(other);
                }
            }
        }
        Ok(adjacent)
    }

    // ============================================================
    // Index definitions
    // ============================================================

    fn check_index_key(key: &str) -> GraphResult<()> {
        if key.is_empty() {
            return Err(GraphError::InvalidPropertyKey(key.to_string()));
        }
        Ok(())
    }

    /// Create an exact-match index on `key`, backfilled from existing
    /// elements. Returns false when it already existed.
    pub fn create_index(&mut self, kind: ElementKind, key: &str) -> GraphResult<bool> {
        self.ensure_open()?;
        Self::check_index_key(key)?;
        match kind {
            ElementKind::Vertex => Ok(self.indices.vertices.create_exact_index(key, self.vertices.values())),
            ElementKind::Edge => Ok(self.indices.edges.create_exact_index(key, self.edges.values())),
            ElementKind::VertexProperty => Err(IndexError::InvalidIndexTarget(kind).into()),
        }
    }

    pub fn create_composite_index(&mut self, kind: ElementKind, keys: &[&str]) -> GraphResult<bool> {
        self.ensure_open()?;
        for key in keys {
            Self::check_index_key(key)?;
        }
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let created = match kind {
            ElementKind::Vertex => self.indices.vertices.create_composite_index(keys, self.vertices.values())?,
            ElementKind::Edge => self.indices.edges.create_composite_index(keys, self.edges.values())?,
            ElementKind::VertexProperty => return Err(IndexError::InvalidIndexTarget(kind).into()),
        };
        Ok(created)
    }

    pub fn create_range_index(&mut self, kind: ElementKind, key: &str) -> GraphResult<bool> {
        self.ensure_open()?;
        Self::check_index_key(key)?;
        match kind {
            ElementKind::Vertex => Ok(self.indices.vertices.create_range_index(key, self.vertices.values())),
            ElementKind::Edge => Ok(self.indices.edges.create_range_index(key, self.edges.values())),
            ElementKind::VertexProperty => Err(IndexError::InvalidIndexTarget(kind).into()),
        }
    }

    fn manager_mut(&mut self, kind: ElementKind) -> GraphResult<&mut crate::index::IndexManager<M>> {
        match kind {
            ElementKind::Vertex => Ok(&mut self.indices.vertices),
            ElementKind::Edge => Ok(&mut self.indices.edges),
            ElementKind::VertexProperty => Err(IndexError::InvalidIndexTarget(kind).into()),
        }
    }

    /// Drop the exact index on `key` and every cached exact lookup
    pub fn drop_index(&mut self, kind: ElementKind, key: &str) -> GraphResult<bool> {
        self.ensure_open()?;
        let dropped = self.manager_mut(kind)?.drop_exact_index(key);
        if dropped {
            self.indices.cache_mut().invalidate_index_type(IndexKind::Exact);
        }
        Ok(dropped)
    }

    pub fn drop_composite_index(&mut self, kind: ElementKind, keys: &[&str]) -> GraphResult<bool> {
        self.ensure_open()?;
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let dropped = self.manager_mut(kind)?.drop_composite_index(&keys);
        if dropped {
            self.indices.cache_mut().invalidate_index_type(IndexKind::Composite);
        }
        Ok(dropped)
    }

    pub fn drop_range_index(&mut self, kind: ElementKind, key: &str) -> GraphResult<bool> {
        self.ensure_open()?;
        let dropped = self.manager_mut(kind)?.drop_range_index(key);
        if dropped {
            self.indices.cache_mut().invalidate_index_type(IndexKind::Range);
        }
        Ok(dropped)
    }

    pub fn has_index(&self, kind: ElementKind, key: &str) -> bool {
        self.indices
            .manager(kind)
            .is_ok_and(|manager| manager.has_exact_index(key))
    }

    pub fn has_composite_index(&self, kind: ElementKind, keys: &[&str]) -> bool {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.indices
            .manager(kind)
            .is_ok_and(|manager| manager.has_composite_index(&keys))
    }

    pub fn has_range_index(&self, kind: ElementKind, key: &str) -> bool {
        self.indices
            .manager(kind)
            .is_ok_and(|manager| manager.has_range_index(key))
    }

    pub fn index_statistics(&self, kind: ElementKind) -> GraphResult<IndexStatistics> {
        Ok(self.indices.manager(kind)?.statistics())
    }

    /// Read-only view of the indices kept for `kind`
    pub fn index_manager(&self, kind: ElementKind) -> GraphResult<&IndexManager<M>> {
        Ok(self.indices.manager(kind)?)
    }

    /// Rescan every element into every index and drop all cached results
    pub fn rebuild_indices(&mut self) -> GraphResult<()> {
        self.ensure_open()?;
        self.indices.vertices.rebuild_all(self.vertices.values());
        self.indices.edges.rebuild_all(self.edges.values());
        self.indices.cache_mut().clear();
        Ok(())
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn query_engine(&self) -> GraphResult<PropertyQueryEngine<'_, M>> {
        self.ensure_open()?;
        Ok(PropertyQueryEngine::new(self))
    }

    /// Vertices matching `predicate`, in insertion order
    pub fn query_vertices(&self, predicate: &PropertyPredicate) -> GraphResult<Vec<&Vertex>> {
        Ok(self.query_engine()?.query_vertices(predicate))
    }

    pub fn query_edges(&self, predicate: &PropertyPredicate) -> GraphResult<Vec<&Edge>> {
        Ok(self.query_engine()?.query_edges(predicate))
    }

    /// Aggregate the values under `key` over the vertices matching `predicate`
    pub fn aggregate_vertices(
        &self,
        predicate: &PropertyPredicate,
        key: &str,
        aggregation: Aggregation,
    ) -> GraphResult<PropertyValue> {
        let engine = self.query_engine()?;
        let vertices = engine.query_vertices(predicate);
        Ok(engine.aggregate(vertices.iter().map(|v| *v as &dyn Element), key, aggregation))
    }

    pub fn aggregate_edges(
        &self,
        predicate: &PropertyPredicate,
        key: &str,
        aggregation: Aggregation,
    ) -> GraphResult<PropertyValue> {
        let engine = self.query_engine()?;
        let edges = engine.query_edges(predicate);
        Ok(engine.aggregate(edges.iter().map(|e| *e as &dyn Element), key, aggregation))
    }

    pub(crate) fn vertex_map(&self) -> &IndexMap<ElementId, Vertex> {
        &self.vertices
    }

    pub(crate) fn edge_map(&self) -> &IndexMap<ElementId, Edge> {
        &self.edges
    }

    pub(crate) fn indices(&self) -> &GraphIndices<M> {
        &self.indices
    }

    // ============================================================
    // Cache, metrics and lifecycle
    // ============================================================

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.indices.cache().statistics()
    }

    /// Drop expired cache entries, returning how many were removed
    pub fn cleanup_cache(&self) -> usize {
        self.indices.cache().cleanup_expired()
    }

    pub fn clear_cache(&self) {
        self.indices.cache().clear();
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn engine_metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn statistics(&self) -> GraphStatistics {
        GraphStatistics {
            vertex_count: self.vertices.len(),
            edge_count: self.edges.len(),
            vertex_property_count: self.vertices.values().map(Vertex::property_count).sum(),
            vertex_indices: self.indices.vertices.statistics(),
            edge_indices: self.indices.edges.statistics(),
            cache: self.cache_statistics(),
        }
    }

    /// Remove every element. Index definitions survive with empty buckets.
    pub fn clear(&mut self) -> GraphResult<()> {
        self.ensure_open()?;
        self.reset_storage();
        info!("graph cleared");
        Ok(())
    }

    fn reset_storage(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.indices.vertices.clear_entries();
        self.indices.edges.clear_entries();
        self.indices.cache_mut().clear();
        self.vertex_ids.reset();
        self.edge_ids.reset();
        self.property_ids.reset();
    }

    /// Release all elements, indices and cached results. Every later
    /// operation fails with [`GraphError::GraphClosed`]; closing twice is a
    /// no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.reset_storage();
        self.indices.vertices.drop_all();
        self.indices.edges.drop_all();
        self.closed = true;
        info!("graph closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Apply one cardinality-aware write to `vertex` without touching indices
fn write_vertex_property(
    vertex: &mut Vertex,
    ids: &mut IdGenerator,
    key: &str,
    value: PropertyValue,
    cardinality: Cardinality,
) -> GraphResult<PropertyWrite> {
    if cardinality == Cardinality::Set {
        if let Some(existing) = vertex.properties(key).iter().find(|p| p.value() == &value) {
            return Ok(PropertyWrite {
                id: existing.id().clone(),
                removed: Vec::new(),
                inserted: false,
            });
        }
    }

    // allocate before touching the vertex so a failure leaves it unchanged
    let id = ids
        .next_id(|_| false)
        .ok_or(GraphError::IdSpaceExhausted(ElementKind::VertexProperty))?;
    let mut removed: Vec<PropertyValue> = Vec::new();
    if cardinality == Cardinality::Single {
        for old in vertex.take_properties(key) {
            if old.value() != &value && !removed.contains(old.value()) {
                removed.push(old.value().clone());
            }
        }
    }

    vertex.push_property(VertexProperty::new(id.clone(), key, value, cardinality));
    Ok(PropertyWrite {
        id,
        removed,
        inserted: true,
    })
}
