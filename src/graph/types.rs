//! Core type definitions for the graph engine

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a vertex, edge or vertex property.
///
/// Ids are hashable and totally ordered; the variant in use is decided by the
/// graph's [`IdManager`](super::id::IdManager) for that element kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementId {
    Long(i64),
    Uuid(Uuid),
    String(String),
}

impl ElementId {
    pub fn as_long(&self) -> Option<i64> {
        match self {
            ElementId::Long(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            ElementId::Uuid(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Long(id) => write!(f, "{}", id),
            ElementId::Uuid(id) => write!(f, "{}", id),
            ElementId::String(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for ElementId {
    fn from(id: i64) -> Self {
        ElementId::Long(id)
    }
}

impl From<Uuid> for ElementId {
    fn from(id: Uuid) -> Self {
        ElementId::Uuid(id)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        ElementId::String(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        ElementId::String(id)
    }
}

/// Vertex or edge label (e.g., "person", "knows")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    /// Label used when a vertex or edge is created without one
    pub const DEFAULT: &'static str = "vertex";

    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Label {
    fn default() -> Self {
        Label(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

/// Which kind of element an index, cache entry or id manager applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
    VertexProperty,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Vertex => write!(f, "vertex"),
            ElementKind::Edge => write!(f, "edge"),
            ElementKind::VertexProperty => write!(f, "vertex property"),
        }
    }
}

/// Edge direction relative to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Out,
    In,
    Both,
}

/// Multiplicity policy for vertex property keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    /// Setting a key replaces every existing value
    #[default]
    Single,
    /// Values are appended in write order, duplicates allowed
    List,
    /// Values are appended unless already present
    Set,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "SINGLE"),
            Cardinality::List => write!(f, "LIST"),
            Cardinality::Set => write!(f, "SET"),
        }
    }
}
