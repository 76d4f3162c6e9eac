//! Resource relationship graph
//!
//! Builds renderer-ready compound graphs from flat resource lists.
//!
//! Two resolvers share one accumulator (`GraphContext`):
//! - `access_builder` - service accounts, roles and the bindings between them
//! - `workload_builder` - controllers, pods, services, ingresses and what pods mount
//!
//! Both are pure: the same input always yields the same elements in the
//! same order.

mod access_builder;
mod context;
pub mod ids;
mod models;
mod namespaces;
mod workload_builder;

pub use access_builder::{
    CLUSTER_BINDING_DEFAULT_NAMESPACE, build_access_graph, build_access_graph_with,
};
pub use context::GraphContext;
pub use models::{
    Edge, EdgeType, Element, Elements, GraphStats, Node, NodeDetails, NodeType,
};
pub use namespaces::{add_namespace_nodes, distinct_namespaces};
pub use workload_builder::{build_workload_graph, build_workload_graph_with};

use serde::Serialize;
use serde_json::Value;

/// Options shared by both builders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Attach the source record to each directly listed node as `raw`
    pub include_raw: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { include_raw: true }
    }
}

impl BuildOptions {
    /// Options without raw records, for compact output
    pub fn compact() -> Self {
        Self { include_raw: false }
    }

    /// Serialized copy of a record when raw output is enabled
    pub(crate) fn raw<T: Serialize>(&self, record: &T) -> Option<Value> {
        if self.include_raw {
            serde_json::to_value(record).ok()
        } else {
            None
        }
    }
}
