//! Graph data structures for visualizing resource relationships
//!
//! Nodes and edges serialize to the element shape a compound-graph renderer
//! consumes: `{ nodes: [{data: Node}], edges: [{data: Edge}] }` with camelCase
//! attribute names.

use crate::models::{ServicePort, ServiceType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Type of node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Compound parent grouping a namespace's resources
    Namespace,
    ServiceAccount,
    Role,
    ClusterRole,
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Pod,
    Service,
    Ingress,
    ConfigMap,
    Secret,
    Pvc,
    /// Synthetic compound zone (e.g. "External")
    Zone,
    /// Synthetic Internet node inside the external zone
    Internet,
}

/// Type of relationship between nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Service account granted a role by a RoleBinding
    RoleBinding,
    /// Service account granted a cluster role by a ClusterRoleBinding
    ClusterRoleBinding,
    /// Owner reference not already conveyed by compound nesting
    Owns,
    /// Service label selector matching a pod
    Selects,
    /// Ingress rule routing to a service
    Routes,
    /// Pod volume or envFrom reference to a ConfigMap, Secret or PVC
    Mounts,
    /// Pod running under a non-default service account
    #[serde(rename = "usessa")]
    UsesServiceAccount,
    /// Internet reachability of an ingress or exposed service
    External,
}

/// Kind-specific node attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum NodeDetails {
    Rules {
        rule_count: usize,
    },
    Replicas {
        replicas: i32,
        ready_replicas: i32,
    },
    Scheduled {
        desired: i32,
        ready: i32,
    },
    Pod {
        #[serde(skip_serializing_if = "Option::is_none")]
        phase: Option<String>,
    },
    Service {
        service_type: ServiceType,
        ports: Vec<ServicePort>,
    },
    ConfigMap {
        data_keys: Vec<String>,
    },
    Secret {
        secret_type: Option<String>,
        data_keys: Vec<String>,
    },
    Claim {
        storage_class: Option<String>,
        capacity: Option<String>,
        pvc_phase: Option<String>,
    },
}

/// A node in the resource graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Deterministic identifier derived from kind, namespace and name
    pub id: String,
    pub label: String,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Compound parent node id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub details: Option<NodeDetails>,
    /// The source record, for detail panels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            namespace: None,
            parent: None,
            details: None,
            raw: None,
        }
    }

    /// Place the node inside a namespace and parent it to the namespace node.
    ///
    /// An empty namespace leaves the node at the top level.
    pub fn in_namespace(mut self, namespace: &str) -> Self {
        if !namespace.is_empty() {
            self.namespace = Some(namespace.to_string());
            self.parent = Some(super::ids::namespace_id(namespace));
        }
        self
    }

    /// Override the compound parent
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_details(mut self, details: NodeDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_raw(mut self, raw: Option<serde_json::Value>) -> Self {
        self.raw = raw;
        self
    }

    /// Rule count of role and cluster role nodes
    pub fn rule_count(&self) -> Option<usize> {
        match self.details {
            Some(NodeDetails::Rules { rule_count }) => Some(rule_count),
            _ => None,
        }
    }
}

/// An edge representing a relationship between nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Provenance-encoding identifier
    pub id: String,
    /// Source node ID
    pub source: String,
    /// Target node ID
    pub target: String,
    pub label: String,
    /// Relationship type
    pub edge_type: EdgeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: EdgeType,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: label.into(),
            edge_type,
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }
}

/// Wrapper required by the renderer: every element sits under `data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element<T> {
    pub data: T,
}

/// Built graph, in per-pass insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Elements {
    pub nodes: Vec<Element<Node>>,
    pub edges: Vec<Element<Edge>>,
}

impl Elements {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().map(|n| &n.data).find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().map(|e| &e.data).find(|e| e.id == id)
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.data.id.as_str()).collect()
    }

    pub fn edge_ids(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.data.id.as_str()).collect()
    }

    /// Edges of one relationship type, in insertion order
    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .map(|e| &e.data)
            .filter(move |e| e.edge_type == edge_type)
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            ..Default::default()
        };
        for node in &self.nodes {
            *stats.nodes_by_type.entry(node.data.node_type).or_default() += 1;
        }
        for edge in &self.edges {
            *stats.edges_by_type.entry(edge.data.edge_type).or_default() += 1;
        }
        stats
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Node and edge counts of a built graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_type: BTreeMap<NodeType, usize>,
    pub edges_by_type: BTreeMap<EdgeType, usize>,
}
