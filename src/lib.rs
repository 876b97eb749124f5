//! TinkerGraph
//!
//! An embedded, in-memory property graph engine following the TinkerPop
//! data model, with property indices kept consistent under every mutation.
//!
//! # Architecture
//!
//! - `graph`: vertices, edges and vertex properties; the only component
//!   that mutates graph state
//! - `index`: exact, composite and range indices plus a bounded,
//!   time-limited cache of index lookups
//! - `query`: conjunctive property predicates, index-vs-scan planning and
//!   aggregations
//! - `platform`: the clock and ordered-map capabilities the engine is
//!   built on, injected at construction
//! - `metrics`: per-graph counters
//!
//! Reads flow query → index (via cache) → element store; writes flow
//! element store → index hooks → cache invalidation.
//!
//! ## Example Usage
//!
//! ```rust
//! use tinkergraph::graph::{Cardinality, ElementKind, Graph, PropertyValue};
//! use tinkergraph::query::{Aggregation, PropertyPredicate};
//!
//! let mut graph = Graph::new();
//! graph.create_range_index(ElementKind::Vertex, "age").unwrap();
//!
//! let alice = graph
//!     .add_vertex_with_properties("person", [("name", "alice".into()), ("age", 25.into())])
//!     .unwrap();
//! graph
//!     .add_vertex_with_properties("person", [("name", "bob".into()), ("age", 30.into())])
//!     .unwrap();
//! graph
//!     .set_vertex_property_with_cardinality(&alice, "skill", "Rust", Cardinality::List)
//!     .unwrap();
//!
//! let young = PropertyPredicate::range("age", Some(20.into()), Some(30.into()), true, false);
//! let hits = graph.query_vertices(&young).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id(), &alice);
//!
//! let total = graph
//!     .aggregate_vertices(&PropertyPredicate::exists("age"), "age", Aggregation::Sum)
//!     .unwrap();
//! assert_eq!(total, PropertyValue::Float(55.0));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod index;
pub mod metrics;
pub mod platform;
pub mod query;

// Re-export main types for convenience
pub use graph::{
    Cardinality, Direction, Edge, Element, ElementId, ElementKind, Graph, GraphConfig, GraphError,
    GraphResult, IdManager, Label, PropertyMap, PropertyValue, Vertex, VertexProperty,
};

pub use index::{CacheStatistics, IndexError, IndexKind, IndexResult, IndexStatistics};

pub use query::{Aggregation, PropertyPredicate, PropertyQueryEngine};

pub use metrics::{EngineMetrics, MetricsSnapshot};

pub use platform::{Clock, ManualClock, MonotonicClock, OrderedMap};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
