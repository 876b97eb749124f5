//! Engine counters owned by a single graph instance
//!
//! One `EngineMetrics` is created per [`Graph`](crate::graph::Graph) and
//! shared by `Arc` with the components that record into it. Counters are
//! relaxed atomics so read-only queries can record without a lock.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct EngineMetrics {
    vertices_added: AtomicU64,
    vertices_removed: AtomicU64,
    edges_added: AtomicU64,
    edges_removed: AtomicU64,
    property_writes: AtomicU64,
    index_updates: AtomicU64,
    index_lookups: AtomicU64,
    full_scans: AtomicU64,
    queries: AtomicU64,
}

/// Point-in-time copy of [`EngineMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub vertices_added: u64,
    pub vertices_removed: u64,
    pub edges_added: u64,
    pub edges_removed: u64,
    pub property_writes: u64,
    pub index_updates: u64,
    pub index_lookups: u64,
    pub full_scans: u64,
    pub queries: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_vertex_added(&self) {
        bump(&self.vertices_added);
    }

    pub fn record_vertex_removed(&self) {
        bump(&self.vertices_removed);
    }

    pub fn record_edge_added(&self) {
        bump(&self.edges_added);
    }

    pub fn record_edge_removed(&self) {
        bump(&self.edges_removed);
    }

    pub fn record_property_write(&self) {
        bump(&self.property_writes);
    }

    pub fn record_index_update(&self) {
        bump(&self.index_updates);
    }

    pub fn record_index_lookup(&self) {
        bump(&self.index_lookups);
    }

    pub fn record_full_scan(&self) {
        bump(&self.full_scans);
    }

    pub fn record_query(&self) {
        bump(&self.queries);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            vertices_added: load(&self.vertices_added),
            vertices_removed: load(&self.vertices_removed),
            edges_added: load(&self.edges_added),
            edges_removed: load(&self.edges_removed),
            property_writes: load(&self.property_writes),
            index_updates: load(&self.index_updates),
            index_lookups: load(&self.index_lookups),
            full_scans: load(&self.full_scans),
            queries: load(&self.queries),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.vertices_added,
            &self.vertices_removed,
            &self.edges_added,
            &self.edges_removed,
            &self.property_writes,
            &self.index_updates,
            &self.index_lookups,
            &self.full_scans,
            &self.queries,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
