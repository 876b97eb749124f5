//! Graph configuration consumed at construction time

use super::id::IdManager;
use super::types::Cardinality;
use serde::{Deserialize, Serialize};

/// Default upper bound on cached index results
pub const DEFAULT_CACHE_MAX_SIZE: usize = 1000;

/// Default lifetime of a cached index result (5 minutes)
pub const DEFAULT_CACHE_MAX_AGE_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Accept `PropertyValue::Null` as a stored value instead of rejecting it
    pub allow_null_property_values: bool,
    /// Cardinality applied when a vertex property is set without one
    pub default_vertex_property_cardinality: Cardinality,
    pub vertex_id_manager: IdManager,
    pub edge_id_manager: IdManager,
    pub vertex_property_id_manager: IdManager,
    pub cache_max_size: usize,
    pub cache_max_age_ms: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            allow_null_property_values: false,
            default_vertex_property_cardinality: Cardinality::Single,
            vertex_id_manager: IdManager::Long,
            edge_id_manager: IdManager::Long,
            vertex_property_id_manager: IdManager::Long,
            cache_max_size: DEFAULT_CACHE_MAX_SIZE,
            cache_max_age_ms: DEFAULT_CACHE_MAX_AGE_MS,
        }
    }
}

impl GraphConfig {
    /// Parse a configuration document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_null_values(mut self, allow: bool) -> Self {
        self.allow_null_property_values = allow;
        self
    }

    pub fn with_default_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.default_vertex_property_cardinality = cardinality;
        self
    }

    pub fn with_cache_limits(mut self, max_size: usize, max_age_ms: u64) -> Self {
        self.cache_max_size = max_size;
        self.cache_max_age_ms = max_age_ms;
        self
    }
}
