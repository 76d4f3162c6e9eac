//! Graph accumulator shared by the builders
//!
//! Every build owns a fresh `GraphContext`; nothing is shared between calls.

use super::ids::namespace_id;
use super::models::{Edge, Element, Elements, Node, NodeType};
use std::collections::{HashMap, HashSet};

/// Deduplicating node/edge accumulator for one graph build
#[derive(Debug, Clone, Default)]
pub struct GraphContext {
    /// All nodes, in insertion order
    nodes: Vec<Node>,
    /// All edges, in insertion order
    edges: Vec<Edge>,
    /// Map from node ID to index in nodes vector
    node_index: HashMap<String, usize>,
    /// Edge ids already emitted through `add_edge`
    edge_ids: HashSet<String>,
}

impl GraphContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Add a node unless its id is already registered.
    ///
    /// First write wins; later calls with the same id are ignored even when
    /// their attributes differ. Returns whether the node was inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add the compound node for a namespace if missing
    pub fn ensure_namespace(&mut self, namespace: &str) {
        let id = namespace_id(namespace);
        if !self.has_node(&id) {
            self.add_node(Node::new(id, namespace, NodeType::Namespace));
        }
    }

    /// Add an edge whose endpoints must already exist.
    ///
    /// Dropped silently when either endpoint is unknown or the id was already
    /// emitted. Returns whether the edge was kept.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.edge_ids.contains(&edge.id) {
            return false;
        }
        if !self.has_node(&edge.source) || !self.has_node(&edge.target) {
            tracing::trace!(
                "Dropping edge {}: endpoint missing ({} -> {})",
                edge.id,
                edge.source,
                edge.target
            );
            return false;
        }
        self.edge_ids.insert(edge.id.clone());
        self.edges.push(edge);
        true
    }

    /// Append an edge without endpoint or id checks.
    ///
    /// Callers synthesize both endpoints first.
    pub fn push_edge(&mut self, edge: Edge) {
        self.edge_ids.insert(edge.id.clone());
        self.edges.push(edge);
    }

    /// Consume the context into renderer elements
    pub fn into_elements(self) -> Elements {
        Elements {
            nodes: self.nodes.into_iter().map(|data| Element { data }).collect(),
            edges: self.edges.into_iter().map(|data| Element { data }).collect(),
        }
    }
}
