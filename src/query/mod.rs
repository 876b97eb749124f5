//! Property query processing
//!
//! Queries are conjunctions of property predicates evaluated against one
//! element kind. The engine answers them from the most selective index it
//! can find (through the index cache) and falls back to a linear scan.

pub mod aggregate;
pub mod engine;
pub mod predicate;

// Re-export main types
pub use aggregate::{aggregate, aggregate_values, Aggregation};
pub use engine::{query_vertex_properties, PropertyQueryEngine};
pub use predicate::{in_range, PropertyPredicate};
