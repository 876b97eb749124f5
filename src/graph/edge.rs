//! Edge implementation for property graph
//!
//! Edges are directed, carry exactly one label, and hold a simple
//! key → single value property map (no multi- or meta-properties).

use super::element::Element;
use super::property::{FromProperty, PropertyMap, PropertyValue};
use super::types::{Cardinality, Direction, ElementId, ElementKind, Label};

/// A directed edge in the property graph
#[derive(Debug, Clone)]
pub struct Edge {
    id: ElementId,
    label: Label,
    /// Edge goes FROM this vertex
    out_vertex: ElementId,
    /// Edge goes TO this vertex
    in_vertex: ElementId,
    properties: PropertyMap,
}

impl Edge {
    pub(crate) fn new(
        id: ElementId,
        out_vertex: ElementId,
        in_vertex: ElementId,
        label: impl Into<Label>,
    ) -> Self {
        Edge {
            id,
            label: label.into(),
            out_vertex,
            in_vertex,
            properties: PropertyMap::new(),
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn out_vertex(&self) -> &ElementId {
        &self.out_vertex
    }

    pub fn in_vertex(&self) -> &ElementId {
        &self.in_vertex
    }

    /// Endpoint ids for a direction; `Both` yields out then in
    pub fn vertex_ids(&self, direction: Direction) -> Vec<&ElementId> {
        match direction {
            Direction::Out => vec![&self.out_vertex],
            Direction::In => vec![&self.in_vertex],
            Direction::Both => vec![&self.out_vertex, &self.in_vertex],
        }
    }

    /// The endpoint opposite to `vertex`
    pub fn other_vertex(&self, vertex: &ElementId) -> &ElementId {
        if &self.out_vertex == vertex {
            &self.in_vertex
        } else {
            &self.out_vertex
        }
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn value<T: FromProperty>(&self, key: &str) -> Option<T> {
        self.get_property(key).and_then(T::from_property)
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Check if this edge connects two vertices (in either direction)
    pub fn connects(&self, a: &ElementId, b: &ElementId) -> bool {
        (&self.out_vertex == a && &self.in_vertex == b) || (&self.out_vertex == b && &self.in_vertex == a)
    }

    pub(crate) fn set_property(&mut self, key: String, value: PropertyValue) -> Option<PropertyValue> {
        self.properties.insert(key, value)
    }

    pub(crate) fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(key)
    }
}

impl Element for Edge {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn label(&self) -> &Label {
        &self.label
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Edge
    }

    fn keys(&self) -> Vec<&str> {
        Edge::keys(self).collect()
    }

    fn values(&self, key: &str) -> Vec<&PropertyValue> {
        self.properties.get(key).into_iter().collect()
    }

    fn cardinality(&self, key: &str) -> Option<Cardinality> {
        self.has_property(key).then_some(Cardinality::Single)
    }

    fn has_key(&self, key: &str) -> bool {
        self.has_property(key)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
