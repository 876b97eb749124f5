//! Vertex and vertex-property implementation
//!
//! A vertex keeps an insertion-ordered multi-map from key to the list of
//! [`VertexProperty`] values written under it, plus adjacency sets of edge
//! ids keyed by edge label. Mutation is crate-private: every change must go
//! through [`Graph`](super::store::Graph) so the indices see it.

use super::element::Element;
use super::property::{FromProperty, PropertyMap, PropertyValue};
use super::types::{Cardinality, Direction, ElementId, ElementKind, Label};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A single value of a vertex property key, with its own id and optional
/// meta-properties (one level deep).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexProperty {
    id: ElementId,
    /// A vertex property is labelled by its key
    key: Label,
    value: PropertyValue,
    cardinality: Cardinality,
    meta: PropertyMap,
}

impl VertexProperty {
    pub(crate) fn new(
        id: ElementId,
        key: impl Into<Label>,
        value: PropertyValue,
        cardinality: Cardinality,
    ) -> Self {
        VertexProperty {
            id,
            key: key.into(),
            value,
            cardinality,
            meta: PropertyMap::new(),
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// All meta-properties in insertion order
    pub fn meta_properties(&self) -> &PropertyMap {
        &self.meta
    }

    pub fn meta_value(&self, key: &str) -> Option<&PropertyValue> {
        self.meta.get(key)
    }

    pub fn has_meta(&self, key: &str) -> bool {
        self.meta.contains_key(key)
    }

    pub(crate) fn set_meta(&mut self, key: String, value: PropertyValue) -> Option<PropertyValue> {
        self.meta.insert(key, value)
    }

    pub(crate) fn remove_meta(&mut self, key: &str) -> Option<PropertyValue> {
        self.meta.shift_remove(key)
    }
}

impl PartialEq for VertexProperty {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VertexProperty {}

impl Element for VertexProperty {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn label(&self) -> &Label {
        &self.key
    }

    fn kind(&self) -> ElementKind {
        ElementKind::VertexProperty
    }

    fn keys(&self) -> Vec<&str> {
        vec![self.key()]
    }

    fn values(&self, key: &str) -> Vec<&PropertyValue> {
        if key == self.key() {
            vec![&self.value]
        } else {
            Vec::new()
        }
    }

    fn cardinality(&self, key: &str) -> Option<Cardinality> {
        (key == self.key()).then_some(self.cardinality)
    }

    fn vertex_properties(&self, key: &str) -> &[VertexProperty] {
        if key == self.key() {
            std::slice::from_ref(self)
        } else {
            &[]
        }
    }
}

/// Adjacency of one direction: edge label -> edge ids
type Adjacency = IndexMap<String, IndexSet<ElementId>>;

/// A vertex in the property graph
#[derive(Debug, Clone)]
pub struct Vertex {
    id: ElementId,
    label: Label,
    properties: IndexMap<String, Vec<VertexProperty>>,
    out_edges: Adjacency,
    in_edges: Adjacency,
}

impl Vertex {
    pub(crate) fn new(id: ElementId, label: impl Into<Label>) -> Self {
        Vertex {
            id,
            label: label.into(),
            properties: IndexMap::new(),
            out_edges: Adjacency::new(),
            in_edges: Adjacency::new(),
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Keys holding at least one value, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// All values of `key` in write order
    pub fn properties(&self, key: &str) -> &[VertexProperty] {
        self.properties.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every vertex property of every key
    pub fn all_properties(&self) -> impl Iterator<Item = &VertexProperty> {
        self.properties.values().flatten()
    }

    /// First value of `key`
    pub fn property(&self, key: &str) -> Option<&VertexProperty> {
        self.properties.get(key).and_then(|props| props.first())
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.property(key).map(VertexProperty::value)
    }

    /// Typed first value of `key`; `None` when absent or of another type
    pub fn value<T: FromProperty>(&self, key: &str) -> Option<T> {
        self.get_property(key).and_then(T::from_property)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Total number of vertex properties across all keys
    pub fn property_count(&self) -> usize {
        self.properties.values().map(Vec::len).sum()
    }

    pub fn vertex_property(&self, id: &ElementId) -> Option<&VertexProperty> {
        self.all_properties().find(|p| &p.id == id)
    }

    /// Incident edge ids in the given direction, optionally restricted to labels
    pub fn edge_ids(&self, direction: Direction, labels: &[&str]) -> Vec<&ElementId> {
        let mut ids = Vec::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            collect_adjacent(&self.out_edges, labels, &mut ids);
        }
        if matches!(direction, Direction::In | Direction::Both) {
            collect_adjacent(&self.in_edges, labels, &mut ids);
        }
        ids
    }

    pub fn out_degree(&self) -> usize {
        self.out_edges.values().map(IndexSet::len).sum()
    }

    pub fn in_degree(&self) -> usize {
        self.in_edges.values().map(IndexSet::len).sum()
    }

    // ============================================================
    // Crate-private mutation, driven by Graph
    // ============================================================

    pub(crate) fn push_property(&mut self, property: VertexProperty) {
        self.properties
            .entry(property.key().to_string())
            .or_default()
            .push(property);
    }

    /// Remove every value of `key`
    pub(crate) fn take_properties(&mut self, key: &str) -> Vec<VertexProperty> {
        self.properties.shift_remove(key).unwrap_or_default()
    }

    pub(crate) fn remove_property_by_id(&mut self, id: &ElementId) -> Option<VertexProperty> {
        let (key, pos) = self.properties.iter().find_map(|(key, props)| {
            props.iter().position(|p| &p.id == id).map(|pos| (key.clone(), pos))
        })?;
        let props = self.properties.get_mut(&key)?;
        let removed = props.remove(pos);
        if props.is_empty() {
            self.properties.shift_remove(&key);
        }
        Some(removed)
    }

    pub(crate) fn vertex_property_mut(&mut self, id: &ElementId) -> Option<&mut VertexProperty> {
        self.properties.values_mut().flatten().find(|p| &p.id == id)
    }

    pub(crate) fn add_out_edge(&mut self, label: &Label, edge: ElementId) {
        self.out_edges.entry(label.as_str().to_string()).or_default().insert(edge);
    }

    pub(crate) fn add_in_edge(&mut self, label: &Label, edge: ElementId) {
        self.in_edges.entry(label.as_str().to_string()).or_default().insert(edge);
    }

    pub(crate) fn remove_out_edge(&mut self, label: &Label, edge: &ElementId) {
        remove_adjacent(&mut self.out_edges, label, edge);
    }

    pub(crate) fn remove_in_edge(&mut self, label: &Label, edge: &ElementId) {
        remove_adjacent(&mut self.in_edges, label, edge);
    }
}

fn collect_adjacent<'a>(adjacency: &'a Adjacency, labels: &[&str], out: &mut Vec<&'a ElementId>) {
    if labels.is_empty() {
        out.extend(adjacency.values().flatten());
    } else {
        for label in labels {
            if let Some(ids) = adjacency.get(*label) {
                out.extend(ids.iter());
            }
        }
    }
}

fn remove_adjacent(adjacency: &mut Adjacency, label: &Label, edge: &ElementId) {
    if let Some(ids) = adjacency.get_mut(label.as_str()) {
        ids.shift_remove(edge);
        if ids.is_empty() {
            adjacency.shift_remove(label.as_str());
        }
    }
}

impl Element for Vertex {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn label(&self) -> &Label {
        &self.label
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Vertex
    }

    fn keys(&self) -> Vec<&str> {
        Vertex::keys(self).collect()
    }

    fn values(&self, key: &str) -> Vec<&PropertyValue> {
        self.properties(key).iter().map(VertexProperty::value).collect()
    }

    fn cardinality(&self, key: &str) -> Option<Cardinality> {
        self.property(key).map(VertexProperty::cardinality)
    }

    fn vertex_properties(&self, key: &str) -> &[VertexProperty] {
        self.properties(key)
    }

    fn has_key(&self, key: &str) -> bool {
        self.has_property(key)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl std::hash::Hash for Vertex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
