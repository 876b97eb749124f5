//! Capabilities reported by a graph instance

use super::config::GraphConfig;
use super::id::IdManager;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphFeatures {
    pub supports_persistence: bool,
    pub supports_transactions: bool,
    pub supports_threaded_transactions: bool,
    pub supports_concurrent_access: bool,
}

/// Id and property capabilities shared by every element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementFeatures {
    pub supports_user_supplied_ids: bool,
    pub supports_numeric_ids: bool,
    pub supports_string_ids: bool,
    pub supports_uuid_ids: bool,
    pub supports_add_property: bool,
    pub supports_remove_property: bool,
    pub supports_null_property_values: bool,
}

impl ElementFeatures {
    fn for_manager(manager: IdManager, config: &GraphConfig) -> Self {
        ElementFeatures {
            supports_user_supplied_ids: true,
            supports_numeric_ids: matches!(manager, IdManager::Long | IdManager::Any),
            supports_string_ids: matches!(manager, IdManager::Any),
            supports_uuid_ids: matches!(manager, IdManager::Uuid),
            supports_add_property: true,
            supports_remove_property: true,
            supports_null_property_values: config.allow_null_property_values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VertexFeatures {
    pub element: ElementFeatures,
    pub supports_multi_properties: bool,
    pub supports_meta_properties: bool,
    pub vertex_property: ElementFeatures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeFeatures {
    pub element: ElementFeatures,
}

/// Feature set of one graph, derived from its configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    pub graph: GraphFeatures,
    pub vertex: VertexFeatures,
    pub edge: EdgeFeatures,
}

impl Features {
    pub fn from_config(config: &GraphConfig) -> Self {
        Features {
            graph: GraphFeatures {
                supports_persistence: false,
                supports_transactions: false,
                supports_threaded_transactions: false,
                supports_concurrent_access: false,
            },
            vertex: VertexFeatures {
                element: ElementFeatures::for_manager(config.vertex_id_manager, config),
                supports_multi_properties: true,
                supports_meta_properties: true,
                vertex_property: ElementFeatures::for_manager(config.vertex_property_id_manager, config),
            },
            edge: EdgeFeatures {
                element: ElementFeatures::for_manager(config.edge_id_manager, config),
            },
        }
    }
}
