//! Property indexing module
//!
//! Three index kinds are kept consistent with the element store:
//! - [`ExactIndex`]: hash lookup of a single key's value
//! - [`CompositeIndex`]: hash lookup of an ordered tuple of values
//! - [`RangeIndex`]: ordered lookup supporting interval queries
//!
//! [`IndexCache`] memoizes recent lookups, and [`IndexManager`] ties the
//! three kinds together behind the auto-update hooks the graph calls.

pub mod cache;
pub mod composite;
pub mod exact;
pub mod manager;
pub mod range;

pub use cache::{CacheKey, CacheParams, CacheStatistics, IndexCache};
pub use composite::CompositeIndex;
pub use exact::ExactIndex;
pub use manager::{IndexManager, IndexStatistics};
pub use range::{DefaultRangeMap, NumberKey, RangeIndex, RangeKey, RangeMap};

use crate::graph::{ElementId, ElementKind};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Set of element ids held by an index bucket or query result
pub type IdSet = FxHashSet<ElementId>;

/// Errors raised by index definition and range lookups
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("cannot index elements of kind {0}")]
    InvalidIndexTarget(ElementKind),

    #[error("composite index requires at least one key")]
    EmptyCompositeKeyList,

    #[error("value {0} cannot be used as a range bound")]
    NonComparableValue(String),

    #[error("property {0} not found")]
    PropertyNotFound(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// The three index kinds, also used to tag cache entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexKind {
    Exact,
    Composite,
    Range,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Exact => write!(f, "exact"),
            IndexKind::Composite => write!(f, "composite"),
            IndexKind::Range => write!(f, "range"),
        }
    }
}
