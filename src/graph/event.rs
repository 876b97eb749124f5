//! Index events emitted by the element store
//!
//! Every mutation of indexed state is described by an [`IndexEvent`] and
//! applied synchronously by [`GraphIndices::handle_index_event`], which keeps
//! the per-kind index managers and the lookup cache consistent with the
//! elements.

use super::element::Element;
use super::property::PropertyValue;
use super::types::ElementKind;
use crate::index::{IndexCache, IndexError, IndexManager, IndexResult, RangeMap};
use crate::metrics::EngineMetrics;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A change to indexed graph state. The element is observed in its state
/// after the change (before removal for `ElementRemoved`).
#[derive(Clone, Copy)]
pub enum IndexEvent<'a> {
    ElementAdded {
        element: &'a dyn Element,
    },
    ElementRemoved {
        element: &'a dyn Element,
    },
    PropertyChanged {
        element: &'a dyn Element,
        key: &'a str,
        old_value: Option<&'a PropertyValue>,
        new_value: Option<&'a PropertyValue>,
    },
}

impl std::fmt::Debug for IndexEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexEvent::ElementAdded { element } => {
                write!(f, "ElementAdded({} {})", element.kind(), element.id())
            }
            IndexEvent::ElementRemoved { element } => {
                write!(f, "ElementRemoved({} {})", element.kind(), element.id())
            }
            IndexEvent::PropertyChanged { element, key, old_value, new_value } => write!(
                f,
                "PropertyChanged({} {} {}: {:?} -> {:?})",
                element.kind(),
                element.id(),
                key,
                old_value,
                new_value
            ),
        }
    }
}

/// Index managers for vertices and edges plus the shared lookup cache
#[derive(Debug)]
pub(crate) struct GraphIndices<M> {
    pub(crate) vertices: IndexManager<M>,
    pub(crate) edges: IndexManager<M>,
    cache: Mutex<IndexCache>,
    metrics: Arc<EngineMetrics>,
}

impl<M: RangeMap> GraphIndices<M> {
    pub(crate) fn new(cache: IndexCache, metrics: Arc<EngineMetrics>) -> Self {
        GraphIndices {
            vertices: IndexManager::for_vertices(),
            edges: IndexManager::for_edges(),
            cache: Mutex::new(cache),
            metrics,
        }
    }

    pub(crate) fn manager(&self, kind: ElementKind) -> IndexResult<&IndexManager<M>> {
        match kind {
            ElementKind::Vertex => Ok(&self.vertices),
            ElementKind::Edge => Ok(&self.edges),
            ElementKind::VertexProperty => Err(IndexError::InvalidIndexTarget(kind)),
        }
    }

    /// Shared access to the cache from read-only queries
    pub(crate) fn cache(&self) -> MutexGuard<'_, IndexCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access while the graph itself is borrowed mutably
    pub(crate) fn cache_mut(&mut self) -> &mut IndexCache {
        self.cache.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn handle_index_event(&mut self, event: IndexEvent<'_>) {
        use IndexEvent::*;
        let manager = match event {
            ElementAdded { element } | ElementRemoved { element } | PropertyChanged { element, .. } => {
                match element.kind() {
                    ElementKind::Vertex => &mut self.vertices,
                    ElementKind::Edge => &mut self.edges,
                    ElementKind::VertexProperty => return,
                }
            }
        };
        let cache = self.cache.get_mut().unwrap_or_else(PoisonError::into_inner);
        match event {
            ElementAdded { element } => {
                manager.on_element_added(element);
                for key in element.keys() {
                    cache.invalidate_key(key);
                }
            }
            ElementRemoved { element } => {
                manager.on_element_removed(element);
                cache.invalidate_element(element.id());
                for key in element.keys() {
                    cache.invalidate_key(key);
                }
            }
            PropertyChanged {
                element,
                key,
                old_value,
                new_value,
            } => {
                manager.on_property_changed(element, key, new_value, old_value);
                cache.invalidate_key(key);
            }
        }
        self.metrics.record_index_update();
    }
}
