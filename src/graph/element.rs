//! Read-only element interface shared by vertices and edges
//!
//! Indices and predicates only see elements through this trait.

use super::property::PropertyValue;
use super::types::{Cardinality, ElementId, ElementKind, Label};
use super::vertex::VertexProperty;

pub trait Element {
    fn id(&self) -> &ElementId;

    fn label(&self) -> &Label;

    fn kind(&self) -> ElementKind;

    /// Property keys in insertion order
    fn keys(&self) -> Vec<&str>;

    /// Every value currently stored under `key` (empty when absent)
    fn values(&self, key: &str) -> Vec<&PropertyValue>;

    /// Cardinality the values under `key` were written with
    fn cardinality(&self, key: &str) -> Option<Cardinality>;

    /// Vertex properties under `key`; edges have none
    fn vertex_properties(&self, _key: &str) -> &[VertexProperty] {
        &[]
    }

    fn has_key(&self, key: &str) -> bool {
        !self.values(key).is_empty()
    }
}
