//! Core property graph implementation
//!
//! This module implements the data model:
//! - Vertices with one label and multi-valued properties (SINGLE/LIST/SET)
//! - Vertex properties with their own id and meta-properties
//! - Directed edges with one label and single-valued properties
//! - Id managers, configuration and feature reporting

pub mod config;
pub mod edge;
pub mod element;
pub mod event;
pub mod features;
pub mod id;
pub mod property;
pub mod store;
pub mod types;
pub mod vertex;

// Re-export main types
pub use config::GraphConfig;
pub use edge::Edge;
pub use element::Element;
pub use event::IndexEvent;
pub use features::Features;
pub use id::IdManager;
pub use property::{FromProperty, PropertyMap, PropertyValue, ValueFamily};
pub use store::{Graph, GraphError, GraphResult, GraphStatistics};
pub use types::{Cardinality, Direction, ElementId, ElementKind, Label};
pub use vertex::{Vertex, VertexProperty};
